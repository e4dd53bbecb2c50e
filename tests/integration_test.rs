//! Integration tests for sluice

use sluice::config::{Config, OffsetReset};
use sluice::schema::{self, UserRecord};
use sluice::sink::statements;

mod config_tests {
    use super::*;

    #[test]
    fn test_config_yaml_parsing() {
        let yaml = r#"
source:
  brokers: "broker:29092"
  topic: "users_created"
  offset_reset: earliest
  commit_interval_secs: 2

sink:
  hosts: ["localhost"]
  keyspace: "spark_streams"
  table: "created_users"
  replication_factor: 1

error_handling:
  max_failures: 10
  dlq_path: "/tmp/sluice-dlq"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.source.brokers, "broker:29092");
        assert_eq!(config.source.topic, "users_created");
        assert_eq!(config.source.offset_reset, OffsetReset::Earliest);
        assert_eq!(config.source.commit_interval_secs, 2);
        assert_eq!(config.sink.keyspace, "spark_streams");
        assert_eq!(config.sink.table, "created_users");
        assert_eq!(config.error_handling.max_failures, 10);
        assert_eq!(
            config.error_handling.dlq_path.as_deref(),
            Some("/tmp/sluice-dlq")
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_config_defaults() {
        let yaml = "{}";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Check defaults match the deployment's fixed constants
        assert_eq!(config.source.brokers, "broker:29092");
        assert_eq!(config.source.topic, "users_created");
        assert_eq!(config.sink.hosts, vec!["localhost".to_string()]);
        assert_eq!(config.sink.keyspace, "spark_streams");
        assert_eq!(config.sink.table, "created_users");
        assert_eq!(config.sink.replication_factor, 1);
        assert!(!config.ingest.enabled);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_config_from_file_with_env_interpolation() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        // SAFETY: unique variable name, set before any concurrent read
        unsafe { std::env::set_var("SLUICE_IT_GROUP_ID", "it-group") };
        std::fs::write(
            &path,
            "source:\n  group_id: ${SLUICE_IT_GROUP_ID}\n  topic: ${SLUICE_IT_TOPIC:-users_created}\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.source.group_id, "it-group");
        assert_eq!(config.source.topic, "users_created");
    }
}

mod projection_tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "0d2c1c5e-2f5a-4f0d-9c6b-1a2b3c4d5e6f",
        "first_name": "Grace",
        "last_name": "Hopper",
        "gender": "female",
        "address": "1 Navy Yard, Arlington",
        "postcode": "22202",
        "email": "grace@example.com",
        "username": "ghopper",
        "dob": "1906-12-09T00:00:00.000Z",
        "registered_date": "2024-01-15T12:00:00.000Z",
        "phone": "703-555-0101",
        "picture": "https://example.com/grace.jpg"
    }"#;

    #[test]
    fn test_sample_payload_projects_verbatim() {
        let record = schema::project(SAMPLE.as_bytes()).unwrap();

        assert_eq!(record.id.to_string(), "0d2c1c5e-2f5a-4f0d-9c6b-1a2b3c4d5e6f");
        assert_eq!(record.first_name, "Grace");
        assert_eq!(record.last_name, "Hopper");
        assert_eq!(record.gender, "female");
        assert_eq!(record.address, "1 Navy Yard, Arlington");
        assert_eq!(record.postcode, "22202");
        assert_eq!(record.email, "grace@example.com");
        assert_eq!(record.username, "ghopper");
        assert_eq!(record.dob.as_deref(), Some("1906-12-09T00:00:00.000Z"));
        assert_eq!(record.registered_date, "2024-01-15T12:00:00.000Z");
        assert_eq!(record.phone, "703-555-0101");
        assert_eq!(record.picture, "https://example.com/grace.jpg");
    }

    #[test]
    fn test_missing_required_key_produces_no_record() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value.as_object_mut().unwrap().remove("username");
        let payload = serde_json::to_vec(&value).unwrap();

        assert!(schema::project(&payload).is_err());
    }

    #[test]
    fn test_schema_exposes_eleven_columns() {
        assert_eq!(UserRecord::COLUMNS.len(), 11);
        assert_eq!(
            UserRecord::COLUMNS,
            [
                "id",
                "first_name",
                "last_name",
                "gender",
                "address",
                "postcode",
                "email",
                "username",
                "registered_date",
                "phone",
                "picture",
            ]
        );
    }
}

mod statement_tests {
    use super::*;

    #[test]
    fn test_bootstrap_statements_are_idempotent() {
        // Calling the builders twice in sequence yields the same
        // IF NOT EXISTS statements, so re-running bootstrap must not fail.
        for _ in 0..2 {
            let ks = statements::create_keyspace("spark_streams", 1);
            let table = statements::create_table("spark_streams", "created_users");
            assert!(ks.starts_with("CREATE KEYSPACE IF NOT EXISTS spark_streams"));
            assert!(table.starts_with("CREATE TABLE IF NOT EXISTS spark_streams.created_users"));
        }
    }

    #[test]
    fn test_insert_statement_consistency() {
        let cql = statements::insert_user("spark_streams", "created_users");
        let table = statements::create_table("spark_streams", "created_users");

        // Every column the insert names exists in the table DDL
        let insert_columns: Vec<&str> = cql
            .split('(')
            .nth(1)
            .unwrap()
            .split(')')
            .next()
            .unwrap()
            .split(',')
            .map(str::trim)
            .collect();
        assert_eq!(insert_columns.len(), 12);
        for column in insert_columns {
            assert!(
                table.contains(column),
                "insert references column {column} missing from table DDL"
            );
        }
    }
}
