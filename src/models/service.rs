//! Purpose: Service catalog models, including the untagged `ServiceConfig` union.
//! Exports: `ServiceDescr`, `ServiceConfig` and its variants, service requests/responses.
//! Role: Typed view of `/v0/services` bodies.
//! Invariants: `ServiceConfig` variants are tried in declaration order (Kafka, then MySQL).
//! Invariants: Encoded configs carry no discriminator key; shape alone identifies the variant.
use crate::core::error::ApiResult;
use crate::core::record::{Extensions, FieldReader, FieldWriter, Record};
use crate::core::union::{Candidate, decode_union};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Service descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceDescr {
    service_id: String,
    name: String,
    description: String,
    config: ServiceConfig,
    extensions: Extensions,
}

impl ServiceDescr {
    pub fn new(
        service_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            name: name.into(),
            description: description.into(),
            config,
            extensions: Extensions::for_fields(Self::FIELDS),
        }
    }

    /// Unique service id.
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

impl Record for ServiceDescr {
    const NAME: &'static str = "ServiceDescr";
    const FIELDS: &'static [&'static str] = &["config", "description", "name", "service_id"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let config = reader.required_with("config", ServiceConfig::from_value)?;
        let description = reader.required_as("description")?;
        let name = reader.required_as("name")?;
        let service_id = reader.required_as("service_id")?;
        Ok(Self {
            service_id,
            name,
            description,
            config,
            extensions: reader.finish(Self::FIELDS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .value("config", self.config.to_value())
            .field("description", self.description.as_str())
            .field("name", self.name.as_str())
            .field("service_id", self.service_id.as_str())
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// A service's configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceConfig {
    Kafka(KafkaServiceConfig),
    Mysql(MysqlServiceConfig),
}

// Keys that select a variant; no variant's extension bag may take one.
const SERVICE_CONFIG_KEYS: &[&str] = &["kafka", "mysql"];

const SERVICE_CONFIG_VARIANTS: [Candidate<ServiceConfig>; 2] = [
    Candidate::new(KafkaServiceConfig::NAME, decode_kafka_variant),
    Candidate::new(MysqlServiceConfig::NAME, decode_mysql_variant),
];

fn decode_kafka_variant(map: Map<String, Value>) -> ApiResult<ServiceConfig> {
    KafkaServiceConfig::from_map(map).map(ServiceConfig::Kafka)
}

fn decode_mysql_variant(map: Map<String, Value>) -> ApiResult<ServiceConfig> {
    MysqlServiceConfig::from_map(map).map(ServiceConfig::Mysql)
}

impl ServiceConfig {
    pub fn from_value(value: Value) -> ApiResult<Self> {
        decode_union("ServiceConfig", value, &SERVICE_CONFIG_VARIANTS)
    }

    pub fn to_value(&self) -> Value {
        match self {
            ServiceConfig::Kafka(config) => config.to_value(),
            ServiceConfig::Mysql(config) => config.to_value(),
        }
    }

    /// Name used by the `config_type` filter of the service list endpoint.
    pub fn config_type(&self) -> &'static str {
        match self {
            ServiceConfig::Kafka(_) => "kafka",
            ServiceConfig::Mysql(_) => "mysql",
        }
    }
}

impl From<KafkaService> for ServiceConfig {
    fn from(kafka: KafkaService) -> Self {
        ServiceConfig::Kafka(KafkaServiceConfig::new(kafka))
    }
}

impl From<MysqlService> for ServiceConfig {
    fn from(mysql: MysqlService) -> Self {
        ServiceConfig::Mysql(MysqlServiceConfig::new(mysql))
    }
}

fn string_map(map: &BTreeMap<String, String>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
        .collect()
}

/// `{"kafka": KafkaService}` variant of `ServiceConfig`.
#[derive(Clone, Debug, PartialEq)]
pub struct KafkaServiceConfig {
    kafka: KafkaService,
    extensions: Extensions,
}

impl KafkaServiceConfig {
    pub fn new(kafka: KafkaService) -> Self {
        Self {
            kafka,
            extensions: Extensions::for_fields(SERVICE_CONFIG_KEYS),
        }
    }

    pub fn kafka(&self) -> &KafkaService {
        &self.kafka
    }
}

impl Record for KafkaServiceConfig {
    const NAME: &'static str = "KafkaServiceConfig";
    const FIELDS: &'static [&'static str] = &["kafka"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let kafka = reader.required_with("kafka", KafkaService::from_value)?;
        Ok(Self {
            kafka,
            extensions: reader.finish(SERVICE_CONFIG_KEYS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .value("kafka", self.kafka.to_value())
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Kafka cluster connection settings.
#[derive(Clone, Debug, PartialEq)]
pub struct KafkaService {
    bootstrap_servers: Vec<String>,
    options: BTreeMap<String, String>,
    extensions: Extensions,
}

impl KafkaService {
    pub fn new(bootstrap_servers: Vec<String>, options: BTreeMap<String, String>) -> Self {
        Self {
            bootstrap_servers,
            options,
            extensions: Extensions::for_fields(Self::FIELDS),
        }
    }

    pub fn bootstrap_servers(&self) -> &[String] {
        &self.bootstrap_servers
    }

    /// librdkafka options shared by every connector using this service.
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }
}

impl Record for KafkaService {
    const NAME: &'static str = "KafkaService";
    const FIELDS: &'static [&'static str] = &["bootstrap_servers", "options"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let bootstrap_servers = reader.required_as("bootstrap_servers")?;
        let options = reader.required_as("options")?;
        Ok(Self {
            bootstrap_servers,
            options,
            extensions: reader.finish(Self::FIELDS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .field("bootstrap_servers", self.bootstrap_servers.clone())
            .field("options", string_map(&self.options))
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// `{"mysql": MysqlService}` variant of `ServiceConfig`.
#[derive(Clone, Debug, PartialEq)]
pub struct MysqlServiceConfig {
    mysql: MysqlService,
    extensions: Extensions,
}

impl MysqlServiceConfig {
    pub fn new(mysql: MysqlService) -> Self {
        Self {
            mysql,
            extensions: Extensions::for_fields(SERVICE_CONFIG_KEYS),
        }
    }

    pub fn mysql(&self) -> &MysqlService {
        &self.mysql
    }
}

impl Record for MysqlServiceConfig {
    const NAME: &'static str = "MysqlServiceConfig";
    const FIELDS: &'static [&'static str] = &["mysql"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let mysql = reader.required_with("mysql", MysqlService::from_value)?;
        Ok(Self {
            mysql,
            extensions: reader.finish(SERVICE_CONFIG_KEYS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .value("mysql", self.mysql.to_value())
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MysqlService {
    hostname: String,
    port: u16,
    user: String,
    password: String,
    extensions: Extensions,
}

impl MysqlService {
    pub fn new(
        hostname: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            user: user.into(),
            password: password.into(),
            extensions: Extensions::for_fields(Self::FIELDS),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Record for MysqlService {
    const NAME: &'static str = "MysqlService";
    const FIELDS: &'static [&'static str] = &["hostname", "password", "port", "user"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let hostname = reader.required_as("hostname")?;
        let password = reader.required_as("password")?;
        let port = reader.required_as("port")?;
        let user = reader.required_as("user")?;
        Ok(Self {
            hostname,
            port,
            user,
            password,
            extensions: reader.finish(Self::FIELDS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .field("hostname", self.hostname.as_str())
            .field("password", self.password.as_str())
            .field("port", self.port)
            .field("user", self.user.as_str())
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Body of `POST /v0/services`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewServiceRequest {
    name: String,
    description: String,
    config: ServiceConfig,
    extensions: Extensions,
}

impl NewServiceRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>, config: ServiceConfig) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            config,
            extensions: Extensions::for_fields(Self::FIELDS),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

impl Record for NewServiceRequest {
    const NAME: &'static str = "NewServiceRequest";
    const FIELDS: &'static [&'static str] = &["config", "description", "name"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let config = reader.required_with("config", ServiceConfig::from_value)?;
        let description = reader.required_as("description")?;
        let name = reader.required_as("name")?;
        Ok(Self {
            name,
            description,
            config,
            extensions: reader.finish(Self::FIELDS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .value("config", self.config.to_value())
            .field("description", self.description.as_str())
            .field("name", self.name.as_str())
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewServiceResponse {
    service_id: String,
    extensions: Extensions,
}

impl NewServiceResponse {
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            extensions: Extensions::for_fields(Self::FIELDS),
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }
}

impl Record for NewServiceResponse {
    const NAME: &'static str = "NewServiceResponse";
    const FIELDS: &'static [&'static str] = &["service_id"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let service_id = reader.required_as("service_id")?;
        Ok(Self {
            service_id,
            extensions: reader.finish(Self::FIELDS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .field("service_id", self.service_id.as_str())
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Body of `PATCH /v0/services/{name}`; unset fields are left unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateServiceRequest {
    name: Option<String>,
    description: Option<String>,
    config: Option<ServiceConfig>,
    extensions: Extensions,
}

impl UpdateServiceRequest {
    pub fn new() -> Self {
        Self {
            name: None,
            description: None,
            config: None,
            extensions: Extensions::for_fields(Self::FIELDS),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn config(&self) -> Option<&ServiceConfig> {
        self.config.as_ref()
    }
}

impl Default for UpdateServiceRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for UpdateServiceRequest {
    const NAME: &'static str = "UpdateServiceRequest";
    const FIELDS: &'static [&'static str] = &["config", "description", "name"];

    fn from_map(map: Map<String, Value>) -> ApiResult<Self> {
        let mut reader = FieldReader::new(Self::NAME, map);
        let config = reader.optional_with("config", ServiceConfig::from_value)?;
        let description = reader.optional_as("description")?;
        let name = reader.optional_as("name")?;
        Ok(Self {
            name,
            description,
            config,
            extensions: reader.finish(Self::FIELDS),
        })
    }

    fn to_map(&self) -> Map<String, Value> {
        FieldWriter::new(&self.extensions)
            .optional("config", self.config.as_ref().map(ServiceConfig::to_value))
            .optional("description", self.description.clone().map(Value::String))
            .optional("name", self.name.clone().map(Value::String))
            .finish()
    }

    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Body of a successful service update; the server returns an empty object.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateServiceResponse {
    extensions: Extensions,
}

open_record!(UpdateServiceResponse, "UpdateServiceResponse");
