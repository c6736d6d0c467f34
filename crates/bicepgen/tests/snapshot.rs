//! Manifest tests
//!
//! Renders each manifests/*.yaml file and compares the template with the
//! *.bicep file next to it.

use pretty_assertions::assert_eq;

#[test]
fn manifests() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("BICEPGEN_LOG"))
        .with_writer(std::io::stderr)
        .init();

    insta::glob!("manifests/*.yaml", |path| {
        let manifest = bicepgen::manifest::Manifest::load_file(path).expect("valid manifest");
        let rendered = manifest
            .into_document()
            .expect("valid document")
            .render()
            .expect("renders");

        let expected = std::fs::read_to_string(path.with_extension("bicep")).unwrap();
        assert_eq!(rendered, expected, "{}", path.display());
    });
}
