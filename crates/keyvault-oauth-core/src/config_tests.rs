//! Tests for client configuration

use super::*;
use serial_test::serial;
use std::io::Write;

const ENV_VARS: [&str; 9] = [
    ENV_CLIENT_ID,
    ENV_CLIENT_SECRET,
    ENV_TENANT_ID,
    ENV_USE_MSI,
    ENV_CLOUD,
    "KEYVAULT_CLIENT_ID",
    "KEYVAULT_CLIENT_SECRET",
    "KEYVAULT_TENANT_ID",
    "KEYVAULT_RETRY__MAX_RETRIES",
];

fn clear_env() {
    for variable in ENV_VARS {
        std::env::remove_var(variable);
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_client_credentials_valid() {
        let config = ClientConfig::client_credentials("app", "secret", "tenant");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_managed_identity_needs_no_secret_or_tenant() {
        assert!(ClientConfig::managed_identity(None).validate().is_ok());
        assert!(ClientConfig::managed_identity(Some("uami".to_string()))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_missing_any_credential_rejected() {
        let base = ClientConfig::client_credentials("app", "secret", "tenant");

        for config in [
            ClientConfig {
                client_id: None,
                ..base.clone()
            },
            ClientConfig {
                client_secret: None,
                ..base.clone()
            },
            ClientConfig {
                tenant_id: None,
                ..base.clone()
            },
            ClientConfig {
                client_secret: Some("   ".to_string()),
                ..base.clone()
            },
            ClientConfig::default(),
        ] {
            let error = config.validate().unwrap_err();
            assert!(error.is_configuration());
            assert!(error.to_string().contains("managed identity"));
        }
    }

    #[test]
    fn test_invalid_custom_cloud_rejected() {
        let config = ClientConfig::managed_identity(None).with_cloud(CloudEnvironment::Custom {
            vault_dns_suffix: String::new(),
            resource: "https://vault.contoso.net".to_string(),
            authority_host: "https://login.contoso.net".to_string(),
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_client_secret() {
        let config = ClientConfig::client_credentials("app", "super-secret-value", "tenant");
        let debug_output = format!("{:?}", config);

        assert!(!debug_output.contains("super-secret-value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("app"));
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::managed_identity(None)
            .with_cloud(CloudEnvironment::AzureUsGovernment)
            .with_retry_policy(RetryPolicy::new(2, 1, 4));

        assert_eq!(config.cloud, CloudEnvironment::AzureUsGovernment);
        assert_eq!(config.retry.max_retries, 2);
    }
}

mod from_env_tests {
    use super::*;

    #[test]
    #[serial]
    fn test_from_env_client_credentials() {
        clear_env();
        std::env::set_var(ENV_CLIENT_ID, "env-app");
        std::env::set_var(ENV_CLIENT_SECRET, "env-secret");
        std::env::set_var(ENV_TENANT_ID, "env-tenant");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.client_id.as_deref(), Some("env-app"));
        assert_eq!(config.tenant_id.as_deref(), Some("env-tenant"));
        assert!(!config.use_managed_identity);
        assert_eq!(config.cloud, CloudEnvironment::AzurePublic);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_managed_identity_in_china() {
        clear_env();
        std::env::set_var(ENV_USE_MSI, "true");
        std::env::set_var(ENV_CLOUD, "china");

        let config = ClientConfig::from_env().unwrap();
        assert!(config.use_managed_identity);
        assert_eq!(config.client_id, None);
        assert_eq!(config.cloud, CloudEnvironment::AzureChina);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_credentials() {
        clear_env();
        std::env::set_var(ENV_CLIENT_ID, "env-app");

        let result = ClientConfig::from_env();
        assert!(matches!(result, Err(SecretClientError::Configuration { .. })));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_flag() {
        clear_env();
        std::env::set_var(ENV_USE_MSI, "maybe");

        let error = ClientConfig::from_env().unwrap_err();
        assert!(error.to_string().contains(ENV_USE_MSI));

        clear_env();
    }
}

mod load_tests {
    use super::*;

    fn write_config(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_load_from_toml_file() {
        clear_env();
        let file = write_config(
            ".toml",
            r#"
client_id = "file-app"
client_secret = "file-secret"
tenant_id = "file-tenant"
cloud = "usgov"

[retry]
max_retries = 3
exponent_cap = 2
"#,
        );

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("file-app"));
        assert_eq!(config.cloud, CloudEnvironment::AzureUsGovernment);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.exponent_cap, 2);
        // Unset fields keep their defaults
        assert_eq!(config.retry.base_delay_seconds, 1);
    }

    #[test]
    #[serial]
    fn test_load_from_yaml_file_with_custom_cloud() {
        clear_env();
        let file = write_config(
            ".yaml",
            r#"
use_managed_identity: true
cloud:
  custom:
    vault_dns_suffix: vault.contoso.net
    resource: https://vault.contoso.net
    authority_host: https://login.contoso.net
"#,
        );

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert!(config.use_managed_identity);
        assert_eq!(config.cloud.vault_dns_suffix(), "vault.contoso.net");
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        clear_env();
        let file = write_config(
            ".toml",
            r#"
client_id = "file-app"
client_secret = "file-secret"
tenant_id = "file-tenant"
"#,
        );
        std::env::set_var("KEYVAULT_CLIENT_ID", "env-app");
        std::env::set_var("KEYVAULT_RETRY__MAX_RETRIES", "1");

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("env-app"));
        assert_eq!(config.client_secret.as_deref(), Some("file-secret"));
        assert_eq!(config.retry.max_retries, 1);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_without_sources_is_invalid() {
        clear_env();

        let result = ClientConfig::load(None);
        assert!(matches!(result, Err(SecretClientError::Configuration { .. })));
    }

    #[test]
    #[serial]
    fn test_load_missing_file_fails() {
        clear_env();

        let result = ClientConfig::load(Some(Path::new("/nonexistent/keyvault.toml")));
        let error = result.unwrap_err();
        assert!(error.to_string().contains("failed to read configuration"));
    }
}
