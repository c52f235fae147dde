use serde_json::json;

use form_spec::{
    FieldConfig, FieldValidator, FieldValue, FormConfig, FormData, InputType, SectionConfig,
    ValidationRule, validate,
};

fn fixture() -> FormConfig {
    FormConfig::from_json_str(include_str!("fixtures/landing_form.json")).expect("fixture")
}

fn data(value: serde_json::Value) -> FormData {
    serde_json::from_value(value).expect("form data")
}

fn email_form() -> FormConfig {
    serde_json::from_value(json!({
        "id": "newsletter",
        "sections": [{
            "title": "Subscribe",
            "fields": [{
                "type": "input",
                "name": "email",
                "input_type": "email",
                "required": true,
                "validation_rules": [
                    { "kind": "required", "message": "Email is required" },
                    { "kind": "email", "message": "Enter a valid email" }
                ]
            }]
        }]
    }))
    .expect("email form")
}

#[test]
fn required_email_field_reports_the_right_message() {
    let config = email_form();

    let errors = validate(&data(json!({})), &config);
    assert_eq!(errors.get("email"), Some("Email is required"));
    assert_eq!(errors.len(), 1);

    let errors = validate(&data(json!({ "email": "not-an-email" })), &config);
    assert_eq!(errors.get("email"), Some("Enter a valid email"));

    let errors = validate(&data(json!({ "email": "a@b.com" })), &config);
    assert!(errors.is_valid());
}

#[test]
fn required_checkbox_without_rules_must_be_true() {
    let config = serde_json::from_value::<FormConfig>(json!({
        "id": "consent",
        "sections": [{
            "title": "Consent",
            "fields": [{ "type": "checkbox", "name": "terms", "label": "Terms", "required": true }]
        }]
    }))
    .expect("consent form");

    let errors = validate(&data(json!({ "terms": false })), &config);
    assert_eq!(errors.get("terms"), Some("Terms is required"));

    let errors = validate(&data(json!({})), &config);
    assert!(errors.contains("terms"));

    let errors = validate(&data(json!({ "terms": true })), &config);
    assert!(errors.is_valid());
}

#[test]
fn required_fallback_applies_only_without_rules() {
    let config = FormConfig::new(
        "fallback",
        vec![SectionConfig::new(
            "Main",
            vec![
                FieldConfig::input("city", InputType::Text).required(true),
                FieldConfig::input("zip", InputType::Text)
                    .required(true)
                    .rule(ValidationRule::max_length(5, "zip too long")),
            ],
        )],
    );

    let errors = validate(&FormData::new(), &config);
    assert_eq!(errors.get("city"), Some("city is required"));
    // explicit rules replace the fallback, so an empty zip passes max_length
    assert!(!errors.contains("zip"));

    let mut filled = FormData::new();
    filled.set("city", "   ");
    assert!(validate(&filled, &config).contains("city"));
}

#[test]
fn custom_validator_runs_after_rules() {
    let config = FormConfig::new(
        "custom",
        vec![SectionConfig::new(
            "Main",
            vec![
                FieldConfig::input("coupon", InputType::Text)
                    .rule(ValidationRule::min_length(4, "coupon too short"))
                    .validator(FieldValidator::new(|value| {
                        (value.as_str() != Some("SAVE10")).then(|| "unknown coupon".to_string())
                    })),
            ],
        )],
    );

    let mut short = FormData::new();
    short.set("coupon", "AB");
    assert_eq!(validate(&short, &config).get("coupon"), Some("coupon too short"));

    let mut unknown = FormData::new();
    unknown.set("coupon", "FREE99");
    assert_eq!(validate(&unknown, &config).get("coupon"), Some("unknown coupon"));

    let mut valid = FormData::new();
    valid.set("coupon", "SAVE10");
    assert!(validate(&valid, &config).is_valid());
}

#[test]
fn hidden_fields_and_sections_never_report_errors() {
    let config = fixture();
    let errors = validate(&FormData::new(), &config);

    assert!(!errors.contains("company"), "hidden section must be skipped");
    assert!(!errors.contains("referral"), "hidden field must be skipped");
    assert!(errors.contains("name"));
    assert!(errors.contains("terms"));
}

#[test]
fn revealed_field_is_caught_at_submit() {
    let mut config = fixture();
    let valid = data(json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "amount": 250,
        "terms": true
    }));
    assert!(validate(&valid, &config).is_valid());

    config.sections[2].show = true;
    let errors = validate(&valid, &config);
    assert_eq!(errors.get("company"), Some("Company is required"));
}

#[test]
fn validation_is_idempotent() {
    let config = fixture();
    let input = data(json!({ "name": "A", "email": "nope", "phone": "123", "amount": 5 }));

    let first = validate(&input, &config);
    let second = validate(&input, &config);
    assert_eq!(first, second);
    assert_eq!(first.get("name"), Some("Name is too short"));
    assert_eq!(first.get("phone"), Some("Phone must have 8 to 15 digits"));
    assert_eq!(first.get("amount"), Some("Minimum is 100"));
}

#[test]
fn type_mismatches_degrade_to_pass() {
    let config = fixture();
    let input = data(json!({
        "name": "Grace Hopper",
        "email": 42,
        "amount": "lots",
        "terms": true
    }));
    let errors = validate(&input, &config);
    // email and min/max ignore values of the wrong type
    assert!(!errors.contains("email"));
    assert!(!errors.contains("amount"));
    assert!(errors.is_valid());
}

#[test]
fn aliased_names_share_one_error_slot() {
    let config = FormConfig::new(
        "alias",
        vec![
            SectionConfig::new(
                "First",
                vec![
                    FieldConfig::input("email", InputType::Email)
                        .rule(ValidationRule::required("first says required")),
                ],
            ),
            SectionConfig::new(
                "Second",
                vec![
                    FieldConfig::input("email", InputType::Email)
                        .rule(ValidationRule::required("second says required")),
                ],
            ),
        ],
    );

    let errors = validate(&FormData::new(), &config);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("email"), Some("first says required"));

    let mut filled = FormData::new();
    filled.set("email", FieldValue::text("a@b.com"));
    assert!(validate(&filled, &config).is_valid());
}
