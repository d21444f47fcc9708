use relgraph::config::{Config, MapperSettings, MappingConfig, MappingKind};
use relgraph::orm::{ColumnDescriptor, ColumnType, EnumDescriptor, ModelDescriptor, RelationshipDescriptor};

/// Create the example configuration: departments and a polymorphic employee
/// hierarchy stored in a single table
pub fn create_example_config() -> Config {
    Config {
        mapper: MapperSettings::default(),
        model: create_example_models(),
        mapping: create_example_mappings(),
    }
}

fn create_example_models() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor::new("Department", "department")
            .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key().autoincrement())
            .column(ColumnDescriptor::new("name", ColumnType::String).not_null())
            .column(ColumnDescriptor::new("budget", ColumnType::Numeric))
            .relationship(
                RelationshipDescriptor::one_to_many("employees", "Employee")
                    .join("id", "department_id")
                    .back_populates("department"),
            ),
        ModelDescriptor::new("Employee", "employee")
            .column(ColumnDescriptor::new("id", ColumnType::Integer).primary_key().autoincrement())
            .column(ColumnDescriptor::new("name", ColumnType::String).not_null())
            .column(ColumnDescriptor::new("type", ColumnType::String).not_null())
            .column(ColumnDescriptor::new("hired_on", ColumnType::Date))
            .column(ColumnDescriptor::new("department_id", ColumnType::Integer))
            .relationship(
                RelationshipDescriptor::many_to_one("department", "Department")
                    .join("department_id", "id")
                    .back_populates("employees"),
            )
            .polymorphic_on("type"),
        ModelDescriptor::new("Engineer", "employee")
            .column(ColumnDescriptor::new("primary_language", ColumnType::String))
            .column(
                ColumnDescriptor::new(
                    "level",
                    ColumnType::Enum(EnumDescriptor::new("EngineerLevel", &["junior", "senior", "staff"])),
                )
                .with_default(),
            )
            .inherits("Employee")
            .polymorphic_identity("engineer"),
        ModelDescriptor::new("Manager", "employee")
            .column(ColumnDescriptor::new("reports", ColumnType::Integer))
            .inherits("Employee")
            .polymorphic_identity("manager"),
    ]
}

fn create_example_mappings() -> Vec<MappingConfig> {
    let mut department = MappingConfig::new("Department", MappingKind::Type);
    department.description = Some("A department and its staff".to_string());

    let mut create_employee = MappingConfig::new("Employee", MappingKind::CreateInput);
    create_employee.exclude = vec!["department".to_string()];

    let mut update_employee = MappingConfig::new("Employee", MappingKind::UpdateInput);
    update_employee.exclude = vec!["department".to_string()];

    vec![
        department,
        MappingConfig::new("Employee", MappingKind::Type),
        MappingConfig::new("Engineer", MappingKind::Type),
        MappingConfig::new("Manager", MappingKind::Type),
        MappingConfig::new("Department", MappingKind::CreateInput),
        create_employee,
        update_employee,
    ]
}

/// Rows for the example models, in the format `MemoryStore::from_json` reads
pub fn create_example_data() -> serde_json::Value {
    serde_json::json!({
        "department": [
            { "id": 1, "name": "Engineering", "budget": 1250000.0 },
            { "id": 2, "name": "Operations", "budget": null }
        ],
        "employee": [
            { "id": 1, "name": "Ada", "type": "engineer", "hired_on": "2019-03-01", "department_id": 1, "primary_language": "Rust", "level": "staff", "reports": null },
            { "id": 2, "name": "Grace", "type": "manager", "hired_on": "2016-11-14", "department_id": 1, "primary_language": null, "level": null, "reports": 4 },
            { "id": 3, "name": "Linus", "type": "engineer", "hired_on": null, "department_id": 2, "primary_language": "C", "level": "senior", "reports": null }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_is_valid() {
        let config = create_example_config();
        assert!(config.validate().is_ok());
        assert!(config.build_mapper().is_ok());
    }

    #[test]
    fn test_example_data_loads() {
        let store = relgraph::orm::MemoryStore::from_json(create_example_data()).unwrap();
        assert_eq!(store.rows("department").len(), 2);
        assert_eq!(store.rows("employee").len(), 3);
    }
}
