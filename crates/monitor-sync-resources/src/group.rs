// crates/monitor-sync-resources/src/group.rs
// ============================================================================
// Module: Group
// Description: RBAC groups binding members to scopes and permissions.
// Purpose: Map scope-binding collections and the permission enumeration.
// Dependencies: crate::shared, monitor-sync-core, monitor-sync-rest, serde
// ============================================================================

//! ## Overview
//! A group holds members and one permission set. The permission set binds
//! six scope collections (applications, Kubernetes clusters, Kubernetes
//! namespaces, mobile apps, websites, and an infrastructure filter) and a set
//! of permissions drawn from [`GROUP_PERMISSIONS`]. On the wire every scope
//! is a `{scopeId, scopeRoleId}` record; state keeps plain ID sets.

// ============================================================================
// SECTION: Imports
// ============================================================================

use monitor_sync_core::BlockView;
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
use monitor_sync_core::core::state::block_list;
use monitor_sync_core::core::state::empty_list;
use monitor_sync_core::core::state::single_block;
use monitor_sync_core::core::state::string_list;
use monitor_sync_rest::RestClient;
use monitor_sync_rest::RestMode;
use monitor_sync_rest::RestObject;
use monitor_sync_rest::RestResource;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::shared::name_fields;
use crate::shared::name_from_state;
use crate::shared::names_to_state;
use crate::shared::put;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource name.
pub const RESOURCE_NAME: &str = "group";
/// Collection path.
pub const PATH: &str = "/api/settings/rbac/groups";

/// Member set.
pub const MEMBER: &str = "member";
/// Permission set block.
pub const PERMISSION_SET: &str = "permission_set";
/// Application scope IDs.
pub const APPLICATION_IDS: &str = "application_ids";
/// Kubernetes cluster scope IDs.
pub const KUBERNETES_CLUSTER_UUIDS: &str = "kubernetes_cluster_uuids";
/// Kubernetes namespace scope IDs.
pub const KUBERNETES_NAMESPACES_UUIDS: &str = "kubernetes_namespaces_uuids";
/// Mobile app scope IDs.
pub const MOBILE_APP_IDS: &str = "mobile_app_ids";
/// Website scope IDs.
pub const WEBSITE_IDS: &str = "website_ids";
/// Infrastructure dynamic focus filter.
pub const INFRA_DFQ_FILTER: &str = "infra_dfq_filter";
/// Permission enumeration set.
pub const PERMISSIONS: &str = "permissions";

/// Permissions a group may grant.
pub const GROUP_PERMISSIONS: &[&str] = &[
    "CAN_CONFIGURE_APPLICATIONS",
    "CAN_SEE_ON_PREM_LICENE_INFORMATION",
    "CAN_CONFIGURE_EUM_APPLICATIONS",
    "CAN_CONFIGURE_AGENTS",
    "CAN_VIEW_TRACE_DETAILS",
    "CAN_VIEW_LOGS",
    "CAN_CONFIGURE_SESSION_SETTINGS",
    "CAN_CONFIGURE_INTEGRATIONS",
    "CAN_CONFIGURE_GLOBAL_ALERT_CONFIGS",
    "CAN_CONFIGURE_GLOBAL_ALERT_PAYLOAD",
    "CAN_CONFIGURE_MOBILE_APP_MONITORING",
    "CAN_CONFIGURE_API_TOKENS",
    "CAN_CONFIGURE_SERVICE_LEVEL_INDICATORS",
    "CAN_CONFIGURE_AUTHENTICATION_METHODS",
    "CAN_CONFIGURE_RELEASES",
    "CAN_VIEW_AUDIT_LOG",
    "CAN_CONFIGURE_EVENTS_AND_ALERTS",
    "CAN_CONFIGURE_MAINTENANCE_WINDOWS",
    "CAN_CONFIGURE_APPLICATION_SMART_ALERTS",
    "CAN_CONFIGURE_WEBSITE_SMART_ALERTS",
    "CAN_CONFIGURE_MOBILE_APP_SMART_ALERTS",
    "CAN_CONFIGURE_AGENT_RUN_MODE",
    "CAN_CONFIGURE_SERVICE_MAPPING",
    "CAN_SEE_USAGE_INFORMATION",
    "CAN_EDIT_ALL_ACCESSIBLE_CUSTOM_DASHBOARDS",
    "CAN_CONFIGURE_USERS",
    "CAN_INSTALL_NEW_AGENTS",
    "CAN_CONFIGURE_TEAMS",
    "CAN_CREATE_PUBLIC_CUSTOM_DASHBOARDS",
    "CAN_CONFIGURE_LOG_MANAGEMENT",
    "CAN_VIEW_ACCOUNT_AND_BILLING_INFORMATION",
];

/// Scope collections of a permission set that state keeps as ID sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeSet {
    /// Application scopes.
    Applications,
    /// Kubernetes cluster scopes.
    KubernetesClusters,
    /// Kubernetes namespace scopes.
    KubernetesNamespaces,
    /// Mobile app scopes.
    MobileApps,
    /// Website scopes.
    Websites,
}

impl ScopeSet {
    /// Every scope collection, in state field order.
    const ALL: [Self; 5] = [
        Self::Applications,
        Self::KubernetesClusters,
        Self::KubernetesNamespaces,
        Self::MobileApps,
        Self::Websites,
    ];

    /// State field holding the collection.
    const fn field(self) -> &'static str {
        match self {
            Self::Applications => APPLICATION_IDS,
            Self::KubernetesClusters => KUBERNETES_CLUSTER_UUIDS,
            Self::KubernetesNamespaces => KUBERNETES_NAMESPACES_UUIDS,
            Self::MobileApps => MOBILE_APP_IDS,
            Self::Websites => WEBSITE_IDS,
        }
    }
}

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Remote RBAC group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group ID.
    #[serde(default)]
    pub id: String,
    /// Full group name.
    pub name: String,
    /// Members.
    #[serde(default)]
    pub members: Vec<GroupMember>,
    /// Scope bindings and permissions.
    pub permission_set: PermissionSet,
}

impl RestObject for Group {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    /// User ID.
    pub user_id: String,
    /// User email, informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Binding of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeBinding {
    /// Scope ID.
    pub scope_id: String,
    /// Role within the scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_role_id: Option<String>,
}

impl ScopeBinding {
    /// Binds a scope without role.
    #[must_use]
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            scope_role_id: None,
        }
    }
}

/// Scope bindings and granted permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Application scopes.
    #[serde(rename = "applicationIds", default)]
    pub application_ids: Vec<ScopeBinding>,
    /// Kubernetes cluster scopes.
    #[serde(rename = "kubernetesClusterUUIDs", default)]
    pub kubernetes_cluster_uuids: Vec<ScopeBinding>,
    /// Kubernetes namespace scopes.
    #[serde(rename = "kubernetesNamespaceUIDs", default)]
    pub kubernetes_namespace_uids: Vec<ScopeBinding>,
    /// Mobile app scopes.
    #[serde(rename = "mobileAppIds", default)]
    pub mobile_app_ids: Vec<ScopeBinding>,
    /// Website scopes.
    #[serde(rename = "websiteIds", default)]
    pub website_ids: Vec<ScopeBinding>,
    /// Infrastructure filter.
    #[serde(rename = "infraDfqFilter", default, skip_serializing_if = "Option::is_none")]
    pub infra_dfq_filter: Option<ScopeBinding>,
    /// Granted permissions.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl PermissionSet {
    /// Returns the bindings of one scope collection.
    const fn scopes(&self, scope: ScopeSet) -> &Vec<ScopeBinding> {
        match scope {
            ScopeSet::Applications => &self.application_ids,
            ScopeSet::KubernetesClusters => &self.kubernetes_cluster_uuids,
            ScopeSet::KubernetesNamespaces => &self.kubernetes_namespace_uids,
            ScopeSet::MobileApps => &self.mobile_app_ids,
            ScopeSet::Websites => &self.website_ids,
        }
    }

    /// Returns the mutable bindings of one scope collection.
    const fn scopes_mut(&mut self, scope: ScopeSet) -> &mut Vec<ScopeBinding> {
        match scope {
            ScopeSet::Applications => &mut self.application_ids,
            ScopeSet::KubernetesClusters => &mut self.kubernetes_cluster_uuids,
            ScopeSet::KubernetesNamespaces => &mut self.kubernetes_namespace_uids,
            ScopeSet::MobileApps => &mut self.mobile_app_ids,
            ScopeSet::Websites => &mut self.website_ids,
        }
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Persisted fields of a group.
#[must_use]
pub fn schema() -> Schema {
    let mut permission_fields: Vec<(&'static str, Field)> = ScopeSet::ALL
        .iter()
        .map(|scope| (scope.field(), Field::set(ValueType::String)))
        .collect();
    permission_fields.push((INFRA_DFQ_FILTER, Field::string()));
    permission_fields.push((
        PERMISSIONS,
        Field::set(ValueType::String).validate(Validator::OneOf(GROUP_PERMISSIONS)),
    ));

    let mut fields: Vec<(&'static str, Field)> = name_fields().into();
    fields.push((
        MEMBER,
        Field::block_set(Schema::new([
            ("user_id", Field::string().required()),
            ("email", Field::string()),
        ]))
        .describe("Users belonging to the group."),
    ));
    fields.push((
        PERMISSION_SET,
        Field::block_list(Schema::new(permission_fields))
            .max_items(1)
            .describe("Scopes and permissions granted to the group."),
    ));
    Schema::new(fields)
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for RBAC groups.
#[derive(Debug, Clone)]
pub struct GroupHandle {
    /// Static description.
    metadata: ResourceMetadata,
}

impl GroupHandle {
    /// Creates the handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: ResourceMetadata {
                name: RESOURCE_NAME,
                schema: schema(),
                schema_version: 0,
                id_field: None,
                skip_id_generation: true,
            },
        }
    }
}

impl Default for GroupHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts the wire permission set into its state block value.
fn permission_set_to_state(set: &PermissionSet) -> Value {
    let scopes_empty = ScopeSet::ALL.iter().all(|scope| set.scopes(*scope).is_empty());
    if scopes_empty && set.infra_dfq_filter.is_none() && set.permissions.is_empty() {
        return empty_list();
    }
    let mut block = Map::new();
    for scope in ScopeSet::ALL {
        let ids = set.scopes(scope).iter().map(|binding| binding.scope_id.as_str());
        put(&mut block, scope.field(), string_list(ids));
    }
    put(
        &mut block,
        INFRA_DFQ_FILTER,
        set.infra_dfq_filter.as_ref().map(|filter| filter.scope_id.clone()),
    );
    put(&mut block, PERMISSIONS, string_list(&set.permissions));
    single_block(block)
}

/// Reads the state permission set block.
fn permission_set_from_state(block: Option<BlockView<'_>>) -> PermissionSet {
    let mut set = PermissionSet::default();
    let Some(block) = block else {
        return set;
    };
    for scope in ScopeSet::ALL {
        *set.scopes_mut(scope) =
            block.strings(scope.field()).into_iter().map(ScopeBinding::new).collect();
    }
    set.infra_dfq_filter = block.string(INFRA_DFQ_FILTER).map(ScopeBinding::new);
    set.permissions = block.strings(PERMISSIONS);
    set
}

impl ResourceHandle for GroupHandle {
    type Model = Group;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn rest_resource<'a>(&self, client: &'a RestClient) -> RestResource<'a, Group> {
        RestResource::new(client, PATH, RestMode::PostCreatePutUpdate)
    }

    fn update_state(
        &self,
        state: &mut ResourceState,
        model: &Group,
        formatter: &NameFormatter,
    ) -> Result<(), SyncError> {
        names_to_state(state, formatter, &model.name);
        let members = model.members.iter().map(|member| {
            let mut block = Map::new();
            put(&mut block, "user_id", member.user_id.as_str());
            put(&mut block, "email", member.email.clone());
            block
        });
        state.set(MEMBER, block_list(members));
        state.set(PERMISSION_SET, permission_set_to_state(&model.permission_set));
        Ok(())
    }

    fn map_state_to_model(
        &self,
        state: &ResourceState,
        formatter: &NameFormatter,
    ) -> Result<Group, SyncError> {
        let members = state
            .blocks(MEMBER)
            .iter()
            .map(|member| GroupMember {
                user_id: member.string_or_empty("user_id"),
                email: member.string("email"),
            })
            .collect();
        Ok(Group {
            id: state.id().to_string(),
            name: name_from_state(state, formatter),
            members,
            permission_set: permission_set_from_state(state.block(PERMISSION_SET)),
        })
    }
}
