//! HTTP client for the authorization service

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::api::AuthorizationApi;
use crate::config::ClientConfig;
use crate::error::{err, AccessError, Result};
use crate::model::{
    Acl, AclRestrictionSet, AssigneeType, IncludePublicPolicy, PermissionMap, PermissionName, ResourceGroup,
    ResourceType,
};

#[derive(Debug, Clone)]
pub struct HttpAuthorizationClient {
    config: ClientConfig,
    client: Client,
}

impl HttpAuthorizationClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build().map_err(err)?;
        Ok(HttpAuthorizationClient { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, route: &str, body: Option<Value>) -> Result<T> {
        let url = self.config.endpoint(route);
        let mut request = self.client.request(method.clone(), url.as_str());
        if let Some(body) = &body {
            request = request.json(body);
        }
        let resp = request.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "authorization request failed");
            err(e)
        })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%method, %url, status = status.as_u16(), "authorization service error");
            return Err(AccessError::Http { status: status.as_u16(), body });
        }
        debug!(%method, %url, status = status.as_u16(), "authorization request");
        let bytes = resp.bytes().await.map_err(err)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn assignee_body(assignee_type: AssigneeType, assignee_id: &str) -> Value {
        json!({ "assigneeType": assignee_type, "assigneeId": assignee_id })
    }
}

#[async_trait]
impl AuthorizationApi for HttpAuthorizationClient {
    async fn account_acls(&self, account_id: &str) -> Result<Vec<Acl>> {
        self.call(Method::GET, &format!("acls/{}", account_id), None).await
    }

    async fn find_my_resource_groups(
        &self,
        account_ids: &[String],
        resource_type: ResourceType,
        permissions: &[PermissionName],
        include_public: IncludePublicPolicy,
    ) -> Result<Vec<PermissionMap>> {
        let body = json!({
            "accountIds": account_ids,
            "resourceType": resource_type,
            "permissions": permissions,
            "filter": { "includePublic": include_public },
        });
        self.call(Method::POST, "resourcegroups/mine/_search", Some(body)).await
    }

    async fn resource_acls(&self, resource: &ResourceGroup, account_id: &str) -> Result<HashMap<String, Vec<Acl>>> {
        let body = json!({ "resourceGroup": resource, "accountId": account_id });
        self.call(Method::POST, "permissions/resourcegroups/_search", Some(body)).await
    }

    async fn add_acl_assignee(
        &self,
        acl_id: &str,
        account_id: &str,
        assignee_type: AssigneeType,
        assignee_id: &str,
    ) -> Result<Acl> {
        let route = format!("acls/{}/{}/assignees", account_id, acl_id);
        self.call(Method::POST, &route, Some(Self::assignee_body(assignee_type, assignee_id))).await
    }

    async fn remove_acl_assignee(
        &self,
        acl_id: &str,
        account_id: &str,
        assignee_type: AssigneeType,
        assignee_id: &str,
    ) -> Result<Acl> {
        let route = format!("acls/{}/{}/assignees", account_id, acl_id);
        self.call(Method::DELETE, &route, Some(Self::assignee_body(assignee_type, assignee_id))).await
    }

    async fn update_acl_assignee(
        &self,
        old_acl_id: &str,
        acl_id: &str,
        account_id: &str,
        assignee_type: AssigneeType,
        assignee_id: &str,
    ) -> Result<Acl> {
        let route = format!("acls/{}/{}/{}/assignees", account_id, old_acl_id, acl_id);
        self.call(Method::POST, &route, Some(Self::assignee_body(assignee_type, assignee_id))).await
    }

    async fn add_document_acl(
        &self,
        account_id: &str,
        document_id: &str,
        role_id: &str,
        restriction: Option<&AclRestrictionSet>,
    ) -> Result<Acl> {
        let mut body = json!({ "roleId": role_id });
        if let Some(restriction) = restriction {
            body["aclRestrictionSet"] = serde_json::to_value(restriction)?;
        }
        let route = format!("documents/addDocAcl/{}/{}", account_id, document_id);
        self.call(Method::POST, &route, Some(body)).await
    }

    async fn grant_public_read_access(&self, account_id: &str, document_id: &str) -> Result<Acl> {
        let route = format!("documents/{}/{}/public-read", account_id, document_id);
        self.call(Method::POST, &route, None).await
    }

    async fn revoke_public_read_access(&self, account_id: &str, document_id: &str) -> Result<Acl> {
        let route = format!("documents/{}/{}/public-read", account_id, document_id);
        self.call(Method::DELETE, &route, None).await
    }
}
