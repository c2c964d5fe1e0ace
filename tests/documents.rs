use std::fs;

use cdn_swap::{ConfigurationError, ConvertError, Converter, PackageResolutionError, make_converter};
use serde_json::{Value, json};
use tempfile::tempdir;

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <link rel="stylesheet" href="css/main.css">
  <link rel="stylesheet" href="//fonts.example.com/css?family=Open+Sans">
  <script type="text/javascript" src="js/vendor/angular/angular.js"></script>
  <script src='js/vendor/firebase/firebase.js'></script>
  <script src="js/app.js"></script>
</head>
<body>
  <a href="#top">top</a>
  <img src="https://example.com/logo.png" alt="">
</body>
</html>
"##;

const STYLE_CSS: &str = r#"body {
  background: url(../img/background.jpg) no-repeat;
}
.logo { background-image: url("../img/logo.png"); }
.icon { background-image: url('../img/icons/arrow.gif'); }
.font { src: url(../fonts/open-sans.woff); }
.remote { background: url(//example.com/x.png); }
"#;

fn convert(config: Value, document: &str) -> String {
  let converter = make_converter(&config).expect("configuration should be valid");
  converter(document).expect("conversion should succeed")
}

#[test]
fn no_match_leaves_html_identical() {
  assert_eq!(convert(json!(["/no/match"]), INDEX_HTML), INDEX_HTML);
}

#[test]
fn no_match_leaves_css_identical() {
  assert_eq!(convert(json!(["/no/match"]), STYLE_CSS), STYLE_CSS);
}

#[test]
fn generic_rewrite_is_insensitive_to_trailing_slash_on_base() {
  let with_slash = convert(
    json!({"files": ["css/main.css", "js/**/*.js"], "defaultCDNBase": "//examplecdn/"}),
    INDEX_HTML,
  );
  let without_slash = convert(
    json!({"files": ["css/*.css", "js/**/*.js"], "defaultCDNBase": "//examplecdn"}),
    INDEX_HTML,
  );

  assert_eq!(with_slash, without_slash);
  let expected = INDEX_HTML
    .replace("href=\"css/main.css\"", "href=\"//examplecdn/css/main.css\"")
    .replace(
      "src=\"js/vendor/angular/angular.js\"",
      "src=\"//examplecdn/js/vendor/angular/angular.js\"",
    )
    .replace(
      "src='js/vendor/firebase/firebase.js'",
      "src='//examplecdn/js/vendor/firebase/firebase.js'",
    )
    .replace("src=\"js/app.js\"", "src=\"//examplecdn/js/app.js\"");
  assert_eq!(with_slash, expected);
}

#[test]
fn fallback_reinstates_local_script() {
  let output = convert(
    json!({
      "files": [{"file": "js/**/angular/angular.js", "test": "window.angular"}],
      "defaultCDNBase": "//examplecdn"
    }),
    INDEX_HTML,
  );

  let cdn_element =
    r#"<script type="text/javascript" src="//examplecdn/js/vendor/angular/angular.js"></script>"#;
  let check = r#"<script>if(!(window.angular)) document.write('<script src="js/vendor/angular/angular.js"><\/script>');</script>"#;
  let expected = INDEX_HTML.replace(
    r#"<script type="text/javascript" src="js/vendor/angular/angular.js"></script>"#,
    &format!("{cdn_element}{check}"),
  );
  assert_eq!(output, expected);

  let cdn_at = output.find(cdn_element).unwrap();
  let check_at = output.find(check).unwrap();
  assert!(cdn_at < check_at);
}

#[test]
fn filename_min_is_derived_from_matched_path() {
  let output = convert(
    json!({
      "files": [{
        "file": "js/**/firebase/firebase.js",
        "cdn": "//examplecdn/js/vendor/firebase/${ filenameMin }"
      }]
    }),
    INDEX_HTML,
  );
  assert!(output.contains("<script src='//examplecdn/js/vendor/firebase/firebase.min.js'></script>"));
  assert!(output.contains(r#"src="js/vendor/angular/angular.js""#));
}

#[test]
fn versions_come_from_components_rc_directory() {
  let project = tempdir().unwrap();
  fs::write(project.path().join(".bowerrc"), r#"{"directory": "lib/components"}"#).unwrap();
  let angular = project.path().join("lib/components/angular");
  fs::create_dir_all(&angular).unwrap();
  fs::write(angular.join(".bower.json"), r#"{"name": "angular", "version": "1.2.26"}"#).unwrap();

  let converter = Converter::new(&json!({
    "files": [{
      "file": "js/**/angular/angular.js",
      "package": "angular",
      "cdn": "//ajax.googleapis.com/ajax/libs/angularjs/${ major }.${ minor }.${ patch }/angular.min.js"
    }]
  }))
  .unwrap()
  .with_project_root(project.path());

  let output = converter.convert(INDEX_HTML).unwrap();
  assert!(output.contains(
    r#"src="//ajax.googleapis.com/ajax/libs/angularjs/1.2.26/angular.min.js""#
  ));
}

#[test]
fn versions_come_from_explicit_components_root() {
  let project = tempdir().unwrap();
  let angular = project.path().join("test/bower_components/angular");
  fs::create_dir_all(&angular).unwrap();
  fs::write(angular.join("bower.json"), r#"{"version": "1.4.2"}"#).unwrap();

  let output = convert(
    json!({
      "projectRoot": project.path().to_str().unwrap(),
      "bowerComponents": "./test/bower_components",
      "files": [{
        "file": "js/**/angular/angular.js",
        "package": "angular",
        "cdn": "//cdn/angular/${ major }.${ minor }.${ patch }/angular.min.js"
      }]
    }),
    INDEX_HTML,
  );
  assert!(output.contains(r#"src="//cdn/angular/1.4.2/angular.min.js""#));
}

#[test]
fn missing_manifest_fails_conversion() {
  let project = tempdir().unwrap();
  let converter = Converter::new(&json!({
    "files": [{"file": "js/**/angular/angular.js", "package": "angular", "cdn": "//x/${ major }"}]
  }))
  .unwrap()
  .with_project_root(project.path());

  assert!(matches!(
    converter.convert(INDEX_HTML),
    Err(ConvertError::Package(PackageResolutionError::ManifestNotFound { .. }))
  ));
}

#[test]
fn css_relative_roots_resolve_parent_references() {
  let output = convert(
    json!({
      "defaultCDNBase": "//examplecdn",
      "relativeRoot": "style",
      "files": ["**/*.{gif,png,jpg,jpeg}"]
    }),
    STYLE_CSS,
  );

  let expected = STYLE_CSS
    .replace("url(../img/background.jpg)", "url(//examplecdn/img/background.jpg)")
    .replace(r#"url("../img/logo.png")"#, r#"url("//examplecdn/img/logo.png")"#)
    .replace("url('../img/icons/arrow.gif')", "url('//examplecdn/img/icons/arrow.gif')");
  assert_eq!(output, expected);
}

#[test]
fn construction_rejects_invalid_configuration() {
  let invalid = [
    Value::Null,
    json!([]),
    json!({}),
    json!({"files": []}),
    json!(9),
    json!({"files": 31}),
    json!({"files": null}),
    json!({"files": {}}),
    json!({"files": [{"file": 9}]}),
    json!({"files": [{"file": {"date": "2014-01-01T00:00:00Z"}}]}),
    json!({"files": ["/not/invalid", {"file": true}]}),
  ];

  for config in invalid {
    let rejected: Option<ConfigurationError> = Converter::new(&config).err();
    assert!(rejected.is_some(), "expected {config} to be rejected");
  }
}
