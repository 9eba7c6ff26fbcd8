// crates/monitor-sync-resources/src/alerting_channel.rs
// ============================================================================
// Module: Alerting Channel
// Description: Notification targets such as email, Slack, or webhooks.
// Purpose: Map the kind-discriminated channel record onto sibling blocks.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde
// ============================================================================

//! ## Overview
//! The remote record carries a `kind` discriminator. State holds one block
//! per kind; exactly one is populated. OpsGenie tags travel as a comma
//! separated string and webhook headers as `"key: value"` lines, while state
//! keeps a tag set and a header map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use monitor_sync_core::Field;
use monitor_sync_core::Fields;
use monitor_sync_core::NameFormatter;
use monitor_sync_core::ResourceHandle;
use monitor_sync_core::ResourceMetadata;
use monitor_sync_core::ResourceState;
use monitor_sync_core::Schema;
use monitor_sync_core::SyncError;
use monitor_sync_core::Validator;
use monitor_sync_core::ValueType;
use monitor_sync_core::VariantAxis;
use monitor_sync_core::core::state::string_list;
use monitor_sync_core::core::state::string_map;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestMode;
use monitor_sync_rest::RestObject;
use monitor_sync_rest::RestResource;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::shared::emit_variant;
use crate::shared::name_fields;
use crate::shared::name_from_state;
use crate::shared::names_to_state;
use crate::shared::put;
use crate::shared::variant_fields;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource name.
pub const RESOURCE_NAME: &str = "alerting_channel";
/// Collection path.
pub const PATH: &str = "/api/events/settings/alertingChannels";
/// Supported OpsGenie regions.
pub const OPS_GENIE_REGIONS: &[&str] = &["EU", "US"];

/// Kind discriminator table.
pub const CHANNEL_AXIS: VariantAxis = VariantAxis {
    label: "alerting channel",
    variants: &[
        ("EMAIL", "email"),
        ("OPS_GENIE", "ops_genie"),
        ("PAGER_DUTY", "pager_duty"),
        ("SLACK", "slack"),
        ("SPLUNK", "splunk"),
        ("VICTOR_OPS", "victor_ops"),
        ("WEB_HOOK", "webhook"),
        ("OFFICE_365", "office_365"),
        ("GOOGLE_CHAT", "google_chat"),
    ],
};

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote alerting channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertingChannel {
    /// Channel ID.
    #[serde(default)]
    pub id: String,
    /// Full channel name.
    pub name: String,
    /// Kind and kind-specific settings.
    #[serde(flatten)]
    pub details: ChannelDetails,
}

impl RestObject for AlertingChannel {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Kind-specific channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ChannelDetails {
    /// Email recipients.
    #[serde(rename = "EMAIL")]
    Email {
        /// Recipient addresses.
        emails: Vec<String>,
    },
    /// OpsGenie integration.
    #[serde(rename = "OPS_GENIE", rename_all = "camelCase")]
    OpsGenie {
        /// Integration key.
        api_key: String,
        /// Comma separated tags.
        tags: String,
        /// `EU` or `US`.
        region: String,
    },
    /// PagerDuty integration.
    #[serde(rename = "PAGER_DUTY", rename_all = "camelCase")]
    PagerDuty {
        /// Service integration key.
        service_integration_key: String,
    },
    /// Slack incoming webhook.
    #[serde(rename = "SLACK", rename_all = "camelCase")]
    Slack {
        /// Webhook URL.
        webhook_url: String,
        /// Icon shown with messages.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon_url: Option<String>,
        /// Channel override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel: Option<String>,
    },
    /// Splunk HTTP event collector.
    #[serde(rename = "SPLUNK")]
    Splunk {
        /// Collector URL.
        url: String,
        /// Collector token.
        token: String,
    },
    /// VictorOps integration.
    #[serde(rename = "VICTOR_OPS", rename_all = "camelCase")]
    VictorOps {
        /// Integration key.
        api_key: String,
        /// Routing key.
        routing_key: String,
    },
    /// Generic webhook.
    #[serde(rename = "WEB_HOOK", rename_all = "camelCase")]
    WebHook {
        /// Target URLs.
        webhook_urls: Vec<String>,
        /// `"key: value"` header lines.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        headers: Vec<String>,
    },
    /// Microsoft Teams connector.
    #[serde(rename = "OFFICE_365", rename_all = "camelCase")]
    Office365 {
        /// Connector URL.
        webhook_url: String,
    },
    /// Google Chat webhook.
    #[serde(rename = "GOOGLE_CHAT", rename_all = "camelCase")]
    GoogleChat {
        /// Webhook URL.
        webhook_url: String,
    },
}

// ============================================================================
// SECTION: Wire Conversions
// ============================================================================

/// Splits a CSV tag string, trimming each entry and dropping empty ones.
#[must_use]
pub fn split_tags(csv: &str) -> Vec<String> {
    csv.split(',').map(str::trim).filter(|tag| !tag.is_empty()).map(str::to_string).collect()
}

/// Joins tags into the wire CSV form.
#[must_use]
pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

/// Parses `"key: value"` lines into a map; the first colon separates.
#[must_use]
pub fn parse_headers(lines: &[String]) -> BTreeMap<String, String> {
    lines
        .iter()
        .map(|line| match line.split_once(':') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (line.trim().to_string(), String::new()),
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Renders a header map as `"key: value"` lines.
#[must_use]
pub fn render_headers(headers: &BTreeMap<String, String>) -> Vec<String> {
    headers.iter().map(|(key, value)| format!("{key}: {value}")).collect()
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Block with a single required webhook URL.
fn webhook_url_block() -> Schema {
    Schema::new([("webhook_url", Field::string().required())])
}

/// Persisted fields of an alerting channel.
#[must_use]
pub fn schema() -> Schema {
    let mut fields: Vec<(&'static str, Field)> = name_fields().into();
    fields.extend(variant_fields(&CHANNEL_AXIS, vec![
        ("email", Schema::new([("emails", Field::set(ValueType::String).required().min_items(1))])),
        (
            "ops_genie",
            Schema::new([
                ("api_key", Field::string().required().sensitive()),
                ("tags", Field::set(ValueType::String).required().min_items(1)),
                ("region", Field::string().required().validate(Validator::OneOf(OPS_GENIE_REGIONS))),
            ]),
        ),
        (
            "pager_duty",
            Schema::new([("service_integration_key", Field::string().required().sensitive())]),
        ),
        (
            "slack",
            Schema::new([
                ("webhook_url", Field::string().required()),
                ("icon_url", Field::string()),
                ("channel", Field::string()),
            ]),
        ),
        (
            "splunk",
            Schema::new([
                ("url", Field::string().required()),
                ("token", Field::string().required().sensitive()),
            ]),
        ),
        (
            "victor_ops",
            Schema::new([
                ("api_key", Field::string().required().sensitive()),
                ("routing_key", Field::string().required()),
            ]),
        ),
        (
            "webhook",
            Schema::new([
                ("webhook_urls", Field::set(ValueType::String).required().min_items(1)),
                ("http_headers", Field::map(ValueType::String)),
            ]),
        ),
        ("office_365", webhook_url_block()),
        ("google_chat", webhook_url_block()),
    ]));
    Schema::new(fields)
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for alerting channels.
#[derive(Debug, Clone)]
pub struct AlertingChannelHandle {
    /// Static description.
    metadata: ResourceMetadata,
}

impl AlertingChannelHandle {
    /// Creates the handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetadata {
                name: RESOURCE_NAME,
                schema: schema(),
                schema_version: 0,
                id_field: None,
                skip_id_generation: false,
            },
        }
    }
}

impl Default for AlertingChannelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts the kind settings into the chosen block name and its content.
fn details_to_block(details: &ChannelDetails) -> (&'static str, Map<String, Value>) {
    let mut inner = Map::new();
    let block = match details {
        ChannelDetails::Email {
            emails,
        } => {
            put(&mut inner, "emails", string_list(emails));
            "email"
        }
        ChannelDetails::OpsGenie {
            api_key,
            tags,
            region,
        } => {
            put(&mut inner, "api_key", api_key.as_str());
            put(&mut inner, "tags", string_list(split_tags(tags)));
            put(&mut inner, "region", region.as_str());
            "ops_genie"
        }
        ChannelDetails::PagerDuty {
            service_integration_key,
        } => {
            put(&mut inner, "service_integration_key", service_integration_key.as_str());
            "pager_duty"
        }
        ChannelDetails::Slack {
            webhook_url,
            icon_url,
            channel,
        } => {
            put(&mut inner, "webhook_url", webhook_url.as_str());
            put(&mut inner, "icon_url", icon_url.clone());
            put(&mut inner, "channel", channel.clone());
            "slack"
        }
        ChannelDetails::Splunk {
            url,
            token,
        } => {
            put(&mut inner, "url", url.as_str());
            put(&mut inner, "token", token.as_str());
            "splunk"
        }
        ChannelDetails::VictorOps {
            api_key,
            routing_key,
        } => {
            put(&mut inner, "api_key", api_key.as_str());
            put(&mut inner, "routing_key", routing_key.as_str());
            "victor_ops"
        }
        ChannelDetails::WebHook {
            webhook_urls,
            headers,
        } => {
            put(&mut inner, "webhook_urls", string_list(webhook_urls));
            put(&mut inner, "http_headers", string_map(parse_headers(headers)));
            "webhook"
        }
        ChannelDetails::Office365 {
            webhook_url,
        } => {
            put(&mut inner, "webhook_url", webhook_url.as_str());
            "office_365"
        }
        ChannelDetails::GoogleChat {
            webhook_url,
        } => {
            put(&mut inner, "webhook_url", webhook_url.as_str());
            "google_chat"
        }
    };
    (block, inner)
}

/// Reads the selected block into kind settings.
fn block_to_details<F: Fields>(block: &str, fields: &F) -> ChannelDetails {
    match block {
        "email" => ChannelDetails::Email {
            emails: fields.strings("emails"),
        },
        "ops_genie" => ChannelDetails::OpsGenie {
            api_key: fields.string_or_empty("api_key"),
            tags: join_tags(&fields.strings("tags")),
            region: fields.string_or_empty("region"),
        },
        "pager_duty" => ChannelDetails::PagerDuty {
            service_integration_key: fields.string_or_empty("service_integration_key"),
        },
        "slack" => ChannelDetails::Slack {
            webhook_url: fields.string_or_empty("webhook_url"),
            icon_url: fields.string("icon_url"),
            channel: fields.string("channel"),
        },
        "splunk" => ChannelDetails::Splunk {
            url: fields.string_or_empty("url"),
            token: fields.string_or_empty("token"),
        },
        "victor_ops" => ChannelDetails::VictorOps {
            api_key: fields.string_or_empty("api_key"),
            routing_key: fields.string_or_empty("routing_key"),
        },
        "webhook" => ChannelDetails::WebHook {
            webhook_urls: fields.strings("webhook_urls"),
            headers: render_headers(&fields.string_map("http_headers")),
        },
        "office_365" => ChannelDetails::Office365 {
            webhook_url: fields.string_or_empty("webhook_url"),
        },
        _ => ChannelDetails::GoogleChat {
            webhook_url: fields.string_or_empty("webhook_url"),
        },
    }
}

impl ResourceHandle for AlertingChannelHandle {
    type Model = AlertingChannel;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn rest_resource<'a>(&self, client: &'a RestClient) -> RestResource<'a, AlertingChannel> {
        RestResource::new(client, PATH, RestMode::PutCreatePutUpdate)
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &AlertingChannel,
        formatter: &NameFormatter,
    ) -> Result<(), SyncError> {
        names_to_state(state, formatter, &model.name);
        let (block, inner) = details_to_block(&model.details);
        emit_variant(state, &CHANNEL_AXIS, block, inner)
    }

    fn map_state_to_model(
        &self,
        state: &ResourceState,
        formatter: &NameFormatter,
    ) -> Result<AlertingChannel, SyncError> {
        let (block, fields) = CHANNEL_AXIS.select(state)?;
        Ok(AlertingChannel {
            id: state.id().to_string(),
            name: name_from_state(state, formatter),
            details: block_to_details(block, &fields),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
