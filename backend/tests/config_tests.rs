//! Tests for settings and repository selection from the environment and TOML files.

mod support;

use std::io::Write;
use std::str::FromStr;

use amy_recruitment::config::{AppSettings, DEFAULT_SUCCESS_URL};
use amy_recruitment::db::factory::{RepositoryFactory, RepositoryType};
use amy_recruitment::db::repository::DirectoryRepository;
use amy_recruitment::db::RepositoryConfig;

#[test]
fn test_settings_from_env_defaults() {
    support::with_config_env(&[], || {
        assert_eq!(AppSettings::from_env(), AppSettings::default());
    });
}

#[test]
fn test_settings_from_env_overrides() {
    support::with_config_env(
        &[
            ("INSTRUCTOR_RECRUITMENT_ENABLED", "false"),
            ("ALLOWED_HOSTS", "amy.carpentries.org, localhost:8000 ,"),
            ("NEW_INSTRUCTOR_DELAY_SEC", "120"),
            ("RECRUITMENT_SUCCESS_URL", "/dashboard/"),
        ],
        || {
            let settings = AppSettings::from_env();
            assert!(!settings.instructor_recruitment_enabled);
            assert_eq!(
                settings.allowed_hosts,
                vec!["amy.carpentries.org", "localhost:8000"]
            );
            assert_eq!(settings.new_instructor_delay_sec, 120);
            assert_eq!(settings.success_url, "/dashboard/");
        },
    );
}

#[test]
fn test_settings_ignore_unparseable_values() {
    support::with_config_env(
        &[
            ("INSTRUCTOR_RECRUITMENT_ENABLED", "sometimes"),
            ("NEW_INSTRUCTOR_DELAY_SEC", "-5"),
            ("RECRUITMENT_SUCCESS_URL", ""),
        ],
        || {
            let settings = AppSettings::from_env();
            assert!(settings.instructor_recruitment_enabled);
            assert_eq!(settings.new_instructor_delay_sec, 3600);
            assert_eq!(settings.success_url, DEFAULT_SUCCESS_URL);
        },
    );
}

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("PG").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("local").unwrap(), RepositoryType::Local);
    assert!(RepositoryType::from_str("sqlite")
        .unwrap_err()
        .contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env() {
    support::with_config_env(&[], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local)
    });
    support::with_config_env(&[("DATABASE_URL", "postgres://localhost/amy")], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres)
    });
    support::with_config_env(
        &[
            ("REPOSITORY_TYPE", "local"),
            ("DATABASE_URL", "postgres://localhost/amy"),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[tokio::test]
async fn test_factory_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[repository]
type = "local"

[recruitment]
new_instructor_delay_sec = 10
"#
    )
    .unwrap();

    let config = RepositoryConfig::from_file(file.path()).unwrap();
    assert_eq!(
        config.recruitment.as_ref().map(|s| s.new_instructor_delay_sec),
        Some(10)
    );

    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_factory_rejects_broken_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = 'sqlite'").unwrap();
    let err = RepositoryFactory::from_config_file(file.path())
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("Invalid repository type"));

    assert!(RepositoryConfig::from_file("/nonexistent/repository.toml").is_err());
}
