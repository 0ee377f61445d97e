//! Custom validator registration through the controller builder.

use std::sync::Arc;

use accord::{
    Schema, SchemaDocument, SchemaError, SchemaKind, ValidationController,
};
use serde_json::{json, Value};

#[test]
fn test_custom_schema_validator_can_veto_construction() {
    // Ban booleans outright: any schema containing one fails to build.
    let controller = Arc::new(
        ValidationController::builder()
            .schema_validator(
                SchemaKind::Boolean,
                |_: &Schema, _: &ValidationController| {
                    Err(SchemaError::schema_invalid("booleans are not allowed here"))
                },
            )
            .build(),
    );

    let err = SchemaDocument::with_controller(
        &json!({
            "type": "object",
            "fields": [{ "type": "boolean", "name": "flag" }]
        }),
        controller.clone(),
    )
    .unwrap_err();
    assert!(
        matches!(err, SchemaError::SchemaInvalid(reason) if reason == "booleans are not allowed here")
    );

    // A schema with no boolean anywhere is unaffected.
    SchemaDocument::with_controller(
        &json!({
            "type": "object",
            "fields": [{ "type": "number", "name": "count" }]
        }),
        controller,
    )
    .unwrap();
}

#[test]
fn test_custom_data_validator_reads_extensions() {
    // Enforce an "x-min" extension on numbers when present.
    let controller = Arc::new(
        ValidationController::builder()
            .data_validator(
                SchemaKind::Number,
                |schema: &Schema, value: &Value, _: &ValidationController| {
                    let Some(min) = schema.extensions().get("x-min").and_then(Value::as_f64)
                    else {
                        return Ok(());
                    };
                    match value.as_f64() {
                        Some(number) if number >= min => Ok(()),
                        Some(number) => Err(SchemaError::data_invalid(format!(
                            "{} is below the minimum {}",
                            number, min
                        ))),
                        // Null already passed the required validator, so the
                        // field is optional and absent.
                        None => Ok(()),
                    }
                },
            )
            .build(),
    );

    let document = SchemaDocument::with_controller(
        &json!({
            "type": "object",
            "fields": [
                { "type": "number", "name": "age", "x-min": 18 },
                { "type": "number", "name": "score" }
            ]
        }),
        controller,
    )
    .unwrap();

    document.validate_data(&json!({ "age": 21, "score": -5 })).unwrap();

    let err = document
        .validate_data(&json!({ "age": 16, "score": 0 }))
        .unwrap_err();
    assert!(matches!(err, SchemaError::DataInvalid(reason) if reason.contains("below the minimum")));
}

#[test]
fn test_required_checks_run_before_customs() {
    // The custom validator would panic on a non-number; the required type
    // check must reject the value first.
    let controller = Arc::new(
        ValidationController::builder()
            .data_validator(
                SchemaKind::Number,
                |_: &Schema, value: &Value, _: &ValidationController| {
                    assert!(value.is_number() || value.is_null());
                    Ok(())
                },
            )
            .build(),
    );

    let document = SchemaDocument::with_controller(
        &json!({
            "type": "array",
            "constType": { "type": "number" }
        }),
        controller,
    )
    .unwrap();

    document.validate_data(&json!([1, 2])).unwrap();
    let err = document.validate_data(&json!(["not a number"])).unwrap_err();
    assert!(matches!(err, SchemaError::DataInvalid(_)));
}

#[test]
fn test_controller_swap_changes_validation_outcome() {
    let document = SchemaDocument::from_value(&json!({
        "type": "object",
        "fields": [{ "type": "string", "name": "id" }]
    }))
    .unwrap();

    let data = json!({ "id": "abc" });
    document.validate_data(&data).unwrap();

    // Swap in a controller whose custom validator rejects every string.
    let strict = Arc::new(
        ValidationController::builder()
            .data_validator(
                SchemaKind::String,
                |_: &Schema, _: &Value, _: &ValidationController| {
                    Err(SchemaError::data_invalid("no strings accepted"))
                },
            )
            .build(),
    );
    document.set_controller(strict);
    let err = document.validate_data(&data).unwrap_err();
    assert!(matches!(err, SchemaError::DataInvalid(reason) if reason == "no strings accepted"));

    // Swapping back restores the original behavior.
    document.set_controller(ValidationController::default_controller());
    document.validate_data(&data).unwrap();
}
