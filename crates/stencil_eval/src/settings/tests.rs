use super::*;
use pretty_assertions::assert_eq;
use stencil_value::RenderErrorKind;

#[test]
fn apply_parses_each_setting() {
    let mut settings = Settings::default();
    settings.apply("locale", "de_DE").unwrap();
    settings.apply("number_format", "0.00").unwrap();
    settings.apply("boolean_format", "yes,no").unwrap();
    settings.apply("arithmetic_engine", "conservative").unwrap();
    settings.apply("error_handler", "ignore").unwrap();
    settings.apply("strict_variables", "yes").unwrap();
    settings.apply("log_template_exceptions", "false").unwrap();

    assert_eq!(settings.locale.as_deref(), Some("de_DE"));
    assert_eq!(settings.number_format.as_deref(), Some("0.00"));
    assert_eq!(settings.boolean_format.as_deref(), Some("yes,no"));
    assert_eq!(settings.arithmetic.as_ref().map(ArithmeticPolicy::name), Some("conservative"));
    assert_eq!(settings.error_handler.as_ref().map(ErrorHandlerPolicy::name), Some("ignore"));
    assert_eq!(settings.strict_variables, Some(true));
    assert_eq!(settings.log_template_exceptions, Some(false));
}

#[test]
fn apply_rejects_bad_values() {
    let mut settings = Settings::default();
    for (name, value) in [
        ("arithmetic_engine", "fast"),
        ("error_handler", "shout"),
        ("strict_variables", "maybe"),
        ("boolean_format", "on"),
        ("no_such_setting", "1"),
    ] {
        let err = settings.apply(name, value).unwrap_err();
        assert!(
            matches!(err.kind, RenderErrorKind::InvalidSetting { .. }),
            "{name}={value} gave {err}"
        );
    }
    assert!(settings.arithmetic.is_none());
    assert!(settings.error_handler.is_none());
}

#[test]
fn c_boolean_format_is_accepted() {
    let mut settings = Settings::default();
    settings.apply("boolean_format", "c").unwrap();
    assert_eq!(settings.boolean_format.as_deref(), Some("c"));
}

#[test]
fn builder_fills_defaults() {
    let config = Configuration::builder().build();
    assert_eq!(&*config.locale, "en_US");
    assert_eq!(&*config.number_format, "number");
    assert_eq!(&*config.boolean_format, "true,false");
    assert_eq!(config.arithmetic.name(), "decimal");
    assert_eq!(config.error_handler.name(), "rethrow");
    assert!(!config.strict_variables);
    assert!(config.log_template_exceptions);
    assert_eq!(config.max_call_depth, Some(1000));
    assert!(config.registry().get_template("missing.ftl").is_err());
}

#[test]
fn builder_keeps_overrides_and_shared_variables() {
    let config = Configuration::builder()
        .settings(Settings::default().locale("fr_FR").strict_variables(true))
        .shared_variable("site", Value::string("example"))
        .max_call_depth(None)
        .build();
    assert_eq!(&*config.locale, "fr_FR");
    assert!(config.strict_variables);
    assert_eq!(config.max_call_depth, None);
    assert_eq!(config.shared_variable("site"), Some(&Value::string("example")));
    assert_eq!(config.shared_variable("other"), None);
}
