//! Channel and type naming for request/reply services.
//!
//! Client and server processes never exchange configuration: both derive
//! the same four names from the service name and the service type name.

const REQUEST_TOPIC_PREFIX: &str = "rq/";
const REQUEST_TOPIC_SUFFIX: &str = "Request";
const REPLY_TOPIC_PREFIX: &str = "rr/";
const REPLY_TOPIC_SUFFIX: &str = "Reply";
const REQUEST_TYPE_SUFFIX: &str = "Request_";
const RESPONSE_TYPE_SUFFIX: &str = "Response_";

/// Derived channel/type names for one logical service.
///
/// ```
/// use sourced_rpc::ServiceDescriptor;
///
/// let names = ServiceDescriptor::derive("get_value", "ValueSrv_");
/// assert_eq!(names.request_topic(), "rq/get_valueRequest");
/// assert_eq!(names.reply_topic(), "rr/get_valueReply");
/// assert_eq!(names.request_type(), "ValueSrv_Request_");
/// assert_eq!(names.response_type(), "ValueSrv_Response_");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    service_name: String,
    service_type_name: String,
    request_topic: String,
    reply_topic: String,
    request_type: String,
    response_type: String,
}

impl ServiceDescriptor {
    /// Derive the naming bundle. Pure and total; names are not validated.
    pub fn derive(service_name: impl Into<String>, service_type_name: impl Into<String>) -> Self {
        let service_name = service_name.into();
        let service_type_name = service_type_name.into();

        Self {
            request_topic: format!("{REQUEST_TOPIC_PREFIX}{service_name}{REQUEST_TOPIC_SUFFIX}"),
            reply_topic: format!("{REPLY_TOPIC_PREFIX}{service_name}{REPLY_TOPIC_SUFFIX}"),
            request_type: format!("{service_type_name}{REQUEST_TYPE_SUFFIX}"),
            response_type: format!("{service_type_name}{RESPONSE_TYPE_SUFFIX}"),
            service_name,
            service_type_name,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn service_type_name(&self) -> &str {
        &self.service_type_name
    }

    pub fn request_topic(&self) -> &str {
        &self.request_topic
    }

    pub fn reply_topic(&self) -> &str {
        &self.reply_topic
    }

    pub fn request_type(&self) -> &str {
        &self.request_type
    }

    pub fn response_type(&self) -> &str {
        &self.response_type
    }
}

/// Free-function form of [`ServiceDescriptor::derive`].
pub fn derive_names(service_name: &str, service_type_name: &str) -> ServiceDescriptor {
    ServiceDescriptor::derive(service_name, service_type_name)
}
