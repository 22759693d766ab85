//! Users, teams and team memberships

use serde_json::{json, Value};
use tracing::{info, warn};

use super::client::PortainerClient;
use super::error::{PortainerError, Result};
use super::models::TeamMembership;
use super::request::ApiRequest;

impl PortainerClient {
    // Users

    pub async fn get_users(&self) -> Result<Value> {
        self.send_json(ApiRequest::get("/api/users")).await
    }

    pub async fn create_user(&self, username: &str, password: &str, role: u32) -> Result<Value> {
        info!("Creating user {} with role {}", username, role);
        let request = ApiRequest::post("/api/users").json(json!({
            "username": username,
            "password": password,
            "role": role,
        }));
        self.send_json(request).await
    }

    pub async fn delete_user(&self, user_id: u64) -> Result<Value> {
        info!("Deleting user {}", user_id);
        self.send_for_status(ApiRequest::delete(format!("/api/users/{user_id}")), "deleted")
            .await
    }

    // Teams

    pub async fn get_teams(&self) -> Result<Value> {
        self.send_json(ApiRequest::get("/api/teams")).await
    }

    pub async fn create_team(&self, name: &str) -> Result<Value> {
        info!("Creating team {}", name);
        let request = ApiRequest::post("/api/teams").json(json!({ "name": name }));
        self.send_json(request).await
    }

    pub async fn delete_team(&self, team_id: u64) -> Result<Value> {
        info!("Deleting team {}", team_id);
        self.send_for_status(ApiRequest::delete(format!("/api/teams/{team_id}")), "deleted")
            .await
    }

    // Memberships

    pub async fn get_team_memberships(&self, team_id: u64) -> Result<Value> {
        self.send_json(ApiRequest::get(format!("/api/teams/{team_id}/memberships")))
            .await
    }

    pub async fn add_user_to_team(&self, team_id: u64, user_id: u64, role: u32) -> Result<Value> {
        info!("Adding user {} to team {} with role {}", user_id, team_id, role);
        let request = ApiRequest::post(format!("/api/teams/{team_id}/memberships")).json(json!({
            "userID": user_id,
            "role": role,
        }));
        self.send_json(request).await
    }

    /// Remove a user from a team
    ///
    /// Reads the team's memberships, then deletes the first one belonging to
    /// `user_id`. The two calls are not atomic: if the membership disappears
    /// in between, the delete's upstream error is returned as is.
    pub async fn remove_user_from_team(&self, team_id: u64, user_id: u64) -> Result<Value> {
        let listing = self.get_team_memberships(team_id).await?;
        let memberships: Vec<TeamMembership> =
            serde_json::from_value(listing).map_err(|e| PortainerError::Decode {
                url: format!("{}/api/teams/{team_id}/memberships", self.base_url()),
                message: e.to_string(),
            })?;

        let Some(membership) = memberships.iter().find(|m| m.user_id == user_id) else {
            warn!("User {} is not a member of team {}", user_id, team_id);
            return Err(PortainerError::NotAMember { team_id, user_id });
        };

        info!(
            "Removing user {} from team {} (membership {}, role {})",
            user_id, team_id, membership.id, membership.role
        );
        let request =
            ApiRequest::delete(format!("/api/teams/{team_id}/memberships/{}", membership.id));
        self.send_for_status(request, "deleted").await
    }
}

#[cfg(test)]
mod tests {
    use crate::portainer::test_support::mock_client;
    use crate::portainer::PortainerError;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_user_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/users")
            .match_body(Matcher::Json(json!({
                "username": "alice",
                "password": "hunter2!",
                "role": 2
            })))
            .with_status(200)
            .with_body(r#"{"Id":8,"Username":"alice","Role":2}"#)
            .create_async()
            .await;

        let client = mock_client(&server);
        let user = client.create_user("alice", "hunter2!", 2).await.unwrap();

        assert_eq!(user["Id"], 8);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_users_and_teams() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/users")
            .with_status(200)
            .with_body(r#"[{"Id":1,"Username":"admin"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/teams")
            .with_status(200)
            .with_body(r#"[{"Id":5,"Name":"ops"}]"#)
            .create_async()
            .await;

        let client = mock_client(&server);
        assert_eq!(client.get_users().await.unwrap()[0]["Username"], "admin");
        assert_eq!(client.get_teams().await.unwrap()[0]["Name"], "ops");
    }

    #[tokio::test]
    async fn test_create_team_and_add_member() {
        let mut server = Server::new_async().await;
        let team = server
            .mock("POST", "/api/teams")
            .match_body(Matcher::Json(json!({ "name": "ops" })))
            .with_status(200)
            .with_body(r#"{"Id":5,"Name":"ops"}"#)
            .create_async()
            .await;
        let member = server
            .mock("POST", "/api/teams/5/memberships")
            .match_body(Matcher::Json(json!({ "userID": 42, "role": 2 })))
            .with_status(200)
            .with_body(r#"{"Id":11,"UserID":42,"TeamID":5,"Role":2}"#)
            .create_async()
            .await;

        let client = mock_client(&server);
        client.create_team("ops").await.unwrap();
        let membership = client.add_user_to_team(5, 42, 2).await.unwrap();

        assert_eq!(membership["Id"], 11);
        team.assert_async().await;
        member.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_user_and_team() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/api/users/8")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/teams/5")
            .with_status(204)
            .create_async()
            .await;

        let client = mock_client(&server);
        assert_eq!(client.delete_user(8).await.unwrap(), json!({ "status": "deleted" }));
        assert_eq!(client.delete_team(5).await.unwrap(), json!({ "status": "deleted" }));
    }

    #[tokio::test]
    async fn test_repeated_delete_surfaces_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/api/users/8")
            .with_status(404)
            .with_body(r#"{"message":"Unable to find a user with the specified identifier inside the database"}"#)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/teams/5")
            .with_status(404)
            .with_body(r#"{"message":"Unable to find a team with the specified identifier inside the database"}"#)
            .create_async()
            .await;

        let client = mock_client(&server);
        assert!(client.delete_user(8).await.unwrap_err().is_not_found());
        assert!(client.delete_team(5).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remove_user_from_team_deletes_matching_membership() {
        let mut server = Server::new_async().await;
        let listing = server
            .mock("GET", "/api/teams/5/memberships")
            .with_status(200)
            .with_body(
                json!([
                    { "Id": 10, "UserID": 7, "TeamID": 5, "Role": 2 },
                    { "Id": 11, "UserID": 42, "TeamID": 5, "Role": 1 }
                ])
                .to_string(),
            )
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/teams/5/memberships/11")
            .with_status(204)
            .create_async()
            .await;

        let client = mock_client(&server);
        let result = client.remove_user_from_team(5, 42).await.unwrap();

        assert_eq!(result, json!({ "status": "deleted" }));
        listing.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_remove_user_not_in_team_sends_no_delete() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/teams/5/memberships")
            .with_status(200)
            .with_body(r#"[{"Id":10,"UserID":7,"TeamID":5,"Role":2}]"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = mock_client(&server);
        let err = client.remove_user_from_team(5, 42).await.unwrap_err();

        assert!(matches!(
            err,
            PortainerError::NotAMember {
                team_id: 5,
                user_id: 42
            }
        ));
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_remove_user_race_returns_delete_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/teams/5/memberships")
            .with_status(200)
            .with_body(r#"[{"Id":11,"UserID":42,"TeamID":5,"Role":2}]"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/teams/5/memberships/11")
            .with_status(404)
            .with_body(r#"{"message":"Unable to find a team membership"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = mock_client(&server);
        let err = client.remove_user_from_team(5, 42).await.unwrap_err();

        assert!(err.is_not_found());
        delete.assert_async().await;
    }
}
