/// Integration tests for validated input models
///
/// These tests verify that inputs registered through the validating mapper:
/// - Validate eagerly on construction, or only on `check()` when postponed
/// - Coerce values and fill defaults once valid
/// - Describe themselves as JSON schema

mod validation_tests {
    use relgraph::mapper::{Mapper, TypeSkeleton};
    use relgraph::orm::{Catalog, ColumnDescriptor, ColumnType, ModelDescriptor};
    use relgraph::validation::{ValidatingMapper, ValidationMode};
    use relgraph::RelgraphError;
    use async_graphql::Value;
    use serde_json::json;

    fn mapper() -> Mapper {
        let catalog = Catalog::from_models(vec![ModelDescriptor::new("Employee", "employee")
            .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key().autoincrement())
            .column(ColumnDescriptor::new("name", ColumnType::String).not_null())
            .column(ColumnDescriptor::new("hired_on", ColumnType::Date))])
        .expect("Failed to build catalog");
        Mapper::with_catalog(catalog)
    }

    fn value(json: serde_json::Value) -> Value {
        Value::from_json(json).unwrap()
    }

    #[test]
    fn test_postponed_validation_check_and_fix() {
        let _ = tracing_subscriber::fmt::try_init();

        let mut adapter = ValidatingMapper::new(mapper(), ValidationMode::Postponed);
        adapter.create_input("Employee", TypeSkeleton::new()).unwrap();
        adapter.finalize().unwrap();

        // Invalid data is accepted on construction
        let mut instance = adapter
            .construct("EmployeeCreateInput", value(json!({ "name": { "first": "Ada" } })))
            .expect("Postponed construction must not validate");
        assert!(!instance.is_validated());

        let err = instance.check().unwrap_err();
        match err {
            RelgraphError::Validation(err) => {
                assert_eq!(err.model, "EmployeeCreateInput");
                assert_eq!(err.errors.len(), 1);
                assert_eq!(err.errors[0].loc, vec!["name".to_string()]);
                assert_eq!(err.errors[0].msg, "str type expected");
                assert_eq!(
                    err.to_string(),
                    "1 validation error for EmployeeCreateInput\nname\n  str type expected"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!instance.is_validated());

        // Fix the value in place and check again
        instance.set("name", Value::Number(42.into()));
        instance.check().expect("Corrected data must validate");
        assert!(instance.is_validated());
        assert_eq!(instance.get("name"), Some(&Value::String("42".into())));
        assert_eq!(instance.get("hired_on"), Some(&Value::Null));
        assert_eq!(instance.fields_set(), ["name".to_string()]);
    }

    #[test]
    fn test_eager_validation_rejects_on_construction() {
        let mut adapter = ValidatingMapper::new(mapper(), ValidationMode::Eager);
        adapter.create_input("Employee", TypeSkeleton::new()).unwrap();
        adapter.finalize().unwrap();

        let err = adapter
            .construct("EmployeeCreateInput", value(json!({ "hired_on": "yesterday" })))
            .unwrap_err();
        match err {
            RelgraphError::Validation(err) => {
                let messages: Vec<(&str, &str)> = err
                    .errors
                    .iter()
                    .map(|e| (e.loc[0].as_str(), e.msg.as_str()))
                    .collect();
                assert_eq!(
                    messages,
                    vec![("name", "field required"), ("hired_on", "invalid date format")]
                );
            }
            other => panic!("unexpected error: {other}"),
        }

        let instance = adapter
            .construct("EmployeeCreateInput", value(json!({ "name": "Ada", "hired_on": "2019-03-01" })))
            .unwrap();
        assert!(instance.is_validated());
        assert_eq!(
            instance.to_value().into_json().unwrap(),
            json!({ "name": "Ada", "hired_on": "2019-03-01" })
        );
    }

    #[test]
    fn test_update_input_requires_identifier() {
        let mut adapter = ValidatingMapper::new(mapper(), ValidationMode::Eager);
        adapter.update_input("Employee", TypeSkeleton::new()).unwrap();
        adapter.finalize().unwrap();

        let instance = adapter
            .construct("EmployeeUpdateInput", value(json!({ "id": 7 })))
            .unwrap();
        assert_eq!(instance.get("id"), Some(&Value::String("7".into())));
        assert_eq!(instance.get("name"), Some(&Value::Null));

        assert!(adapter
            .construct("EmployeeUpdateInput", value(json!({ "name": "Ada" })))
            .is_err());
    }

    #[test]
    fn test_json_schema() {
        let mut adapter = ValidatingMapper::new(mapper(), ValidationMode::Eager);
        adapter
            .create_input("Employee", TypeSkeleton::new().exclude("hired_on"))
            .unwrap();
        let schema = adapter.finalize().unwrap();

        let model = schema.model("EmployeeCreateInput").unwrap();
        let document = model.json_schema(&schema);
        assert_eq!(document["title"], json!("EmployeeCreateInput"));
        assert_eq!(document["type"], json!("object"));
        assert_eq!(
            document["properties"],
            json!({ "name": { "title": "Name", "type": "string" } })
        );
        assert_eq!(document["required"], json!(["name"]));
    }

    #[test]
    fn test_decimal_keeps_exact_text() {
        let catalog = Catalog::from_models(vec![ModelDescriptor::new("Invoice", "invoice")
            .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key().autoincrement())
            .column(ColumnDescriptor::new("amount", ColumnType::Numeric).not_null())])
        .expect("Failed to build catalog");

        let mut adapter = ValidatingMapper::new(Mapper::with_catalog(catalog), ValidationMode::Eager);
        adapter.create_input("Invoice", TypeSkeleton::new()).unwrap();
        adapter.finalize().unwrap();

        let instance = adapter
            .construct("InvoiceCreateInput", value(json!({ "amount": "12345678901234567.89" })))
            .unwrap();
        assert_eq!(
            instance.get("amount"),
            Some(&Value::String("12345678901234567.89".into()))
        );

        let err = adapter
            .construct("InvoiceCreateInput", value(json!({ "amount": "a lot" })))
            .unwrap_err();
        assert!(err.to_string().contains("value is not a valid decimal"), "{err}");
    }
}
