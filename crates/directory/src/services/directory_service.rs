use std::time::Duration;

use classadmin_config::ApiConfig;
use futures_util::future::{join_all, try_join_all};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::entities::{
    ClassRoom, ClassRoomPatch, Network, School, SchoolPatch, Structure, User, UserPatch,
};
use crate::types::{
    BlockRequest, ClassInfoUpdate, CreateAccountRequest, DirectoryError, DirectoryResult,
    FetchClassOptions, FetchNetworkOptions, PersonApiResults, RemoveUsersRequest,
    ResetDestination, ResetPasswordRequest,
};

/// Client for the directory REST endpoints.
///
/// Holds no state besides the HTTP client and its configuration; cloning is
/// cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct DirectoryService {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    import_path: String,
}

impl DirectoryService {
    pub fn new(config: &ApiConfig) -> DirectoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            import_path: config.import_path.trim_start_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn import_url(&self) -> String {
        format!("{}/{}", self.base_url, self.import_path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_to(method, format!("{}{}", self.base_url, path))
    }

    pub(crate) fn request_to(&self, method: Method, url: String) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> DirectoryResult<Response> {
        Ok(request.send().await?.error_for_status()?)
    }

    pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> DirectoryResult<T> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> DirectoryResult<T> {
        debug!(%path, "directory GET");
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::read_json(response).await
    }

    /// Load every school of the operator's network and link parents to children.
    ///
    /// With `with_schools`, the classes and users of every school are fetched
    /// concurrently before returning; a single failing school fails the whole
    /// call.
    pub async fn fetch_network(&self, options: FetchNetworkOptions) -> DirectoryResult<Network> {
        let schools: Vec<School> = self.get_json("/userbook/structures").await?;
        let mut network = Network::from_flat_schools(schools);
        info!(schools = network.schools.len(), "network loaded");

        if options.with_schools {
            let patches = try_join_all(
                network
                    .schools
                    .iter()
                    .map(|school| self.fetch_school_patch(&school.id)),
            )
            .await?;

            for (school, patch) in network.schools.iter_mut().zip(patches) {
                school.update_data(patch);
            }
            debug!(schools = network.schools.len(), "school details merged");
        }

        Ok(network)
    }

    async fn fetch_school_patch(&self, id: &str) -> DirectoryResult<SchoolPatch> {
        let mut patch: SchoolPatch = self.get_json(&format!("/userbook/structure/{id}")).await?;
        patch.id = Some(id.to_string());
        Ok(patch)
    }

    /// Fetch the classes and users of one school into a new [`School`].
    pub async fn fetch_school(&self, id: &str) -> DirectoryResult<School> {
        let mut school = School::default();
        school.update_data(self.fetch_school_patch(id).await?);
        Ok(school)
    }

    /// Fetch the classes and users of `school` and merge them in place.
    pub async fn refresh_school(&self, school: &mut School) -> DirectoryResult<()> {
        let patch = self.fetch_school_patch(&school.id).await?;
        school.update_data(patch);
        Ok(())
    }

    pub async fn fetch_class_by_id(
        &self,
        class_id: &str,
        options: FetchClassOptions,
    ) -> DirectoryResult<ClassRoom> {
        if class_id.is_empty() {
            return Err(DirectoryError::NoActiveClassroom);
        }

        let mut patch: ClassRoomPatch = self.get_json(&format!("/directory/class/{class_id}")).await?;
        patch.id = Some(class_id.to_string());

        let mut classroom = ClassRoom::default();
        classroom.update_data(patch);

        if options.with_users {
            classroom.users = self.fetch_users_for_class(class_id).await?;
        }

        debug!(class_id, users = classroom.users.len(), "class fetched");
        Ok(classroom)
    }

    /// Roster of a class ordered by last name.
    ///
    /// The order is a plain byte comparison on the last name, with unnamed
    /// users first; it is not the accent-aware order of the user list.
    pub async fn fetch_users_for_class(&self, class_id: &str) -> DirectoryResult<Vec<User>> {
        if class_id.is_empty() {
            return Err(DirectoryError::NoActiveClassroom);
        }

        let mut users: Vec<User> = self
            .get_json(&format!("/directory/class/{class_id}/users"))
            .await?;
        users.sort_by(|left, right| left.last_name.cmp(&right.last_name));
        Ok(users)
    }

    pub async fn save_class_infos(&self, classroom: &ClassRoom) -> DirectoryResult<()> {
        if classroom.id.is_empty() {
            return Err(DirectoryError::NoActiveClassroom);
        }

        let body = ClassInfoUpdate {
            name: classroom.name.clone(),
            level: classroom.level.clone(),
        };
        self.send(
            self.request(Method::PUT, &format!("/directory/class/{}", classroom.id))
                .json(&body),
        )
        .await?;
        info!(class_id = %classroom.id, "class infos saved");
        Ok(())
    }

    /// Delete accounts in one request.
    pub async fn remove_users(&self, users: &[User]) -> DirectoryResult<Vec<String>> {
        let ids: Vec<String> = users.iter().map(|user| user.id.clone()).collect();
        let body = RemoveUsersRequest { users: ids.clone() };
        self.send(self.request(Method::POST, "/directory/user/delete").json(&body))
            .await?;
        info!(count = ids.len(), "users removed");
        Ok(ids)
    }

    /// Block or unblock accounts, one request per account.
    ///
    /// The `blocked` flag is flipped on every user before any request is
    /// sent and stays flipped even if some requests fail; the first failure
    /// is returned once all requests have completed.
    pub async fn block_users(&self, value: bool, users: &mut [User]) -> DirectoryResult<()> {
        for user in users.iter_mut() {
            user.blocked = value;
        }

        let results = join_all(users.iter().map(|user| self.set_blocked(&user.id, value))).await;
        let failures = results.iter().filter(|result| result.is_err()).count();
        if failures > 0 {
            warn!(failures, total = users.len(), blocked = value, "some block requests failed");
        }
        results.into_iter().collect::<DirectoryResult<Vec<()>>>()?;
        Ok(())
    }

    pub(crate) async fn set_blocked(&self, user_id: &str, value: bool) -> DirectoryResult<()> {
        self.send(
            self.request(Method::PUT, &format!("/auth/block/{user_id}"))
                .json(&BlockRequest { block: value }),
        )
        .await?;
        debug!(user_id, blocked = value, "block state sent");
        Ok(())
    }

    /// Send password reset instructions for every user, one request each.
    pub async fn reset_passwords(
        &self,
        users: &[User],
        destination: &ResetDestination,
    ) -> DirectoryResult<()> {
        try_join_all(users.iter().map(|user| {
            self.send_reset_request(user.login.clone().unwrap_or_default(), destination)
        }))
        .await?;
        info!(count = users.len(), "password resets sent");
        Ok(())
    }

    pub(crate) async fn send_reset_request(
        &self,
        login: String,
        destination: &ResetDestination,
    ) -> DirectoryResult<()> {
        let body = ResetPasswordRequest::new(login, destination);
        self.send(self.request(Method::POST, "/auth/sendResetPassword").json(&body))
            .await?;
        Ok(())
    }

    /// Create `user` in the class and merge the created account back into it.
    pub async fn add_user(&self, class_id: &str, user: &mut User) -> DirectoryResult<()> {
        if class_id.is_empty() {
            return Err(DirectoryError::NoActiveClassroom);
        }
        if user.user_type.is_none() {
            return Err(DirectoryError::invalid_user_data("a type is required to create an account"));
        }

        let body = CreateAccountRequest::from_user(user);
        let response = self
            .send(
                self.request(Method::POST, &format!("/directory/class/{class_id}/user"))
                    .json(&body),
            )
            .await?;
        let created: UserPatch = Self::read_json(response).await?;
        user.update_data(created);
        info!(class_id, user_id = %user.id, "user created");
        Ok(())
    }

    /// Attach an existing account to a class.
    pub async fn grab_user(&self, class_id: &str, user: &User) -> DirectoryResult<()> {
        if class_id.is_empty() {
            return Err(DirectoryError::NoActiveClassroom);
        }
        if !user.has_id() {
            return Err(DirectoryError::MissingUserId);
        }

        self.send(self.request(
            Method::PUT,
            &format!("/directory/class/{class_id}/add/{}", user.id),
        ))
        .await?;
        Ok(())
    }

    /// Load the public profile of `user` from the person API.
    ///
    /// When the API knows nothing about the user its id is cleared.
    pub async fn open_user(&self, user: &mut User) -> DirectoryResult<()> {
        if !user.has_id() {
            return Err(DirectoryError::MissingUserId);
        }

        let user_type = user.user_type.map(|kind| kind.as_str()).unwrap_or_default();
        let response = self
            .send(
                self.request(Method::GET, "/userbook/api/person")
                    .query(&[("id", user.id.as_str()), ("type", user_type)]),
            )
            .await?;
        let data: PersonApiResults = Self::read_json(response).await?;

        let relatives: Vec<User> = data
            .result
            .iter()
            .filter_map(|row| row.relative())
            .collect();

        let Some(first) = data.result.into_iter().next() else {
            debug!(user_id = %user.id, "person not found");
            user.id.clear();
            return Ok(());
        };

        let mut patch = first.person;
        patch.hobbies = Some(
            patch
                .hobbies
                .unwrap_or_default()
                .into_iter()
                .filter(|hobby| !hobby.values.is_empty())
                .collect(),
        );
        patch.relatives = Some(relatives);
        patch.attached_structures = Some(first.schools);
        user.update_data(patch);
        Ok(())
    }

    /// Load the structures of the user's children.
    pub async fn load_children(&self, user: &mut User) -> DirectoryResult<()> {
        if !user.has_id() {
            return Err(DirectoryError::MissingUserId);
        }

        let children: Vec<Structure> = self
            .get_json(&format!("/directory/user/{}/children", user.id))
            .await?;
        user.update_data(UserPatch {
            children_structure: Some(children),
            ..UserPatch::default()
        });
        Ok(())
    }
}
