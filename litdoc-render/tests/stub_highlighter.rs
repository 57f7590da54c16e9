//! End-to-end exercise of the subprocess path with a stub highlighter.
//!
//! The stub is a shell script that behaves like `pygmentize -f html`: it
//! wraps stdin in the whole-blob wrapper and renders divider lines as
//! comment spans. Unix-only because the stub is a shell script.
#![cfg(unix)]

use litdoc_parser::languages::Language;
use litdoc_parser::sections::sectionize;
use litdoc_render::highlight::{HighlightError, Highlighter};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

fn write_stub(dir: &std::path::Path, body: &str) -> PathBuf {
    let path = dir.join("stub-pygmentize");
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

const STUB: &str = r#"#!/bin/sh
printf '<div class="highlight"><pre>'
sed 's|^#DIVIDER$|<span class="c">#DIVIDER</span>|'
printf '</pre></div>\n'
"#;

#[tokio::test]
async fn highlight_populates_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), STUB);

    let language = Language::new("python", "#");
    let mut sections = sectionize(&language, "x=1\n# c\ny=2\n# d\nz=3\n");
    assert_eq!(sections.len(), 3);

    Highlighter::new(&stub)
        .highlight(&language, &mut sections)
        .await
        .unwrap();

    for section in &sections {
        let code = section.code_html.as_deref().unwrap();
        assert!(code.starts_with("<div class=\"highlight\"><pre>"));
        assert!(code.ends_with("</pre></div>"));
        assert!(!code.contains("DIVIDER"));
        assert!(section.docs_html.is_some());
    }
    assert!(sections[1].code_html.as_deref().unwrap().contains("y=2"));
    assert_eq!(sections[1].docs_html.as_deref().unwrap(), "<p>c</p>\n");
}

#[tokio::test]
async fn self_check_passes_against_a_conforming_highlighter() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), STUB);

    let language = Language::new("python", "#");
    Highlighter::new(&stub).self_check(&language).await.unwrap();
}

#[tokio::test]
async fn self_check_catches_a_class_naming_change() {
    let dir = tempfile::tempdir().unwrap();
    // A highlighter that emits a span class the registry does not match.
    let stub = write_stub(
        dir.path(),
        r#"#!/bin/sh
printf '<div class="highlight"><pre>'
sed 's|^#DIVIDER$|<span class="cm">#DIVIDER</span>|'
printf '</pre></div>\n'
"#,
    );

    let language = Language::new("python", "#");
    match Highlighter::new(&stub).self_check(&language).await {
        Err(HighlightError::DividerMismatch { expected, found }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected DividerMismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let language = Language::new("python", "#");
    let mut sections = sectionize(&language, "x = 1\n");
    let result = Highlighter::new("/definitely/not/a/highlighter")
        .highlight(&language, &mut sections)
        .await;
    match result {
        Err(HighlightError::Spawn { .. }) => {}
        other => panic!("expected Spawn error, got {:?}", other),
    }
    assert!(sections[0].code_html.is_none());
}

#[tokio::test]
async fn silent_exit_is_a_no_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        "#!/bin/sh\ncat > /dev/null\necho 'boom' >&2\nexit 1\n",
    );

    let language = Language::new("python", "#");
    let mut sections = sectionize(&language, "x = 1\n");
    match Highlighter::new(&stub).highlight(&language, &mut sections).await {
        Err(HighlightError::NoOutput { status, stderr, .. }) => {
            assert_eq!(status, Some(1));
            assert!(stderr.contains("boom"));
        }
        other => panic!("expected NoOutput error, got {:?}", other),
    }
}
