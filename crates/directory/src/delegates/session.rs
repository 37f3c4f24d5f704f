use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::actions::ActionsDelegate;
use super::menu::{resolve_initial_class, MenuDelegate};
use super::user_list::{selected_users, UserListDelegate};
use crate::context::{Notifier, Operator, PreferenceStore, Translator, SELECTED_CLASS_PREFERENCE};
use crate::entities::{ClassRoom, ClassRoomPatch, User, UserType};
use crate::listing::SortColumn;
use crate::services::{ClassLoader, DirectoryService, LoadOutcome};
use crate::types::{
    DirectoryError, DirectoryResult, FetchNetworkOptions, ImportRequest, ResetDestination,
    SessionEvent,
};

const EVENT_CAPACITY: usize = 64;

/// One operator's class administration session.
///
/// Owns the menu, user list and actions delegates; every mutation goes
/// through `&mut self`, so a session has a single writer. Observers follow
/// changes through [`ClassAdminSession::subscribe`].
pub struct ClassAdminSession {
    service: DirectoryService,
    loader: ClassLoader,
    preferences: Arc<dyn PreferenceStore>,
    notifier: Arc<dyn Notifier>,
    translator: Arc<dyn Translator>,
    operator: Operator,
    menu: MenuDelegate,
    user_list: UserListDelegate,
    actions: ActionsDelegate,
    events: broadcast::Sender<SessionEvent>,
}

impl ClassAdminSession {
    pub fn new(
        service: DirectoryService,
        preferences: Arc<dyn PreferenceStore>,
        notifier: Arc<dyn Notifier>,
        translator: Arc<dyn Translator>,
        operator: Operator,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            loader: ClassLoader::new(service.clone()),
            service,
            preferences,
            notifier,
            translator,
            operator,
            menu: MenuDelegate::new(),
            user_list: UserListDelegate::new(),
            actions: ActionsDelegate::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn service(&self) -> &DirectoryService {
        &self.service
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    pub fn menu(&self) -> &MenuDelegate {
        &self.menu
    }

    pub fn user_list(&self) -> &UserListDelegate {
        &self.user_list
    }

    pub fn actions(&self) -> &ActionsDelegate {
        &self.actions
    }

    pub fn current_class(&self) -> Option<&ClassRoom> {
        self.menu.selected_class()
    }

    /// Users shown for the current tab, search and sort.
    pub fn visible_users(&self) -> Vec<&User> {
        match self.menu.selected_class() {
            Some(classroom) => self
                .user_list
                .visible_users(classroom, self.translator.as_ref()),
            None => Vec::new(),
        }
    }

    fn emit(&self, event: SessionEvent) {
        debug!(event = event.name(), "session event");
        // No subscriber is not an error.
        let _ = self.events.send(event);
    }

    fn publish_selection(&mut self) {
        let selection = self
            .menu
            .selected_class()
            .map(selected_users)
            .unwrap_or_default();
        let ids = selection.iter().map(|user| user.id.clone()).collect();
        self.actions.on_selection_changed(selection);
        self.emit(SessionEvent::SelectionChanged { selected: ids });
    }

    fn require_class_id(&self) -> DirectoryResult<String> {
        self.menu
            .selected_class_id()
            .map(str::to_string)
            .ok_or(DirectoryError::NoActiveClassroom)
    }

    fn after_class_load(&mut self, outcome: &LoadOutcome<()>) {
        if outcome.is_applied() {
            if let Some(class_id) = self.menu.selected_class_id().map(str::to_string) {
                self.emit(SessionEvent::ClassLoaded { class_id });
            }
            self.publish_selection();
        }
    }

    /// Load the network, then open the preferred classroom.
    ///
    /// Returns the id of the opened classroom, `None` when the operator has
    /// no classroom to open.
    pub async fn init(&mut self) -> DirectoryResult<Option<String>> {
        let network = self
            .service
            .fetch_network(FetchNetworkOptions { with_schools: true })
            .await?;
        let schools = network.schools.len();
        self.menu.on_network_loaded(network, &self.operator);
        self.emit(SessionEvent::NetworkLoaded { schools });

        let preference = self.preferences.get(SELECTED_CLASS_PREFERENCE).await?;
        let Some(class_id) =
            resolve_initial_class(preference.as_deref(), &self.operator, self.menu.network())
        else {
            warn!("operator has no classroom to open");
            return Ok(None);
        };

        self.select_classroom(&class_id).await?;
        info!(%class_id, "session initialised");
        Ok(Some(class_id))
    }

    pub async fn select_classroom(&mut self, class_id: &str) -> DirectoryResult<LoadOutcome<()>> {
        let outcome = self
            .menu
            .select_classroom(class_id, self.preferences.as_ref(), &self.loader)
            .await;
        match outcome {
            Ok(outcome) => {
                self.after_class_load(&outcome);
                Ok(outcome)
            }
            Err(error) => {
                self.publish_selection();
                Err(error)
            }
        }
    }

    /// Open `class_id` for this session only; the stored preference is left as is.
    pub async fn open_classroom(&mut self, class_id: &str) -> DirectoryResult<LoadOutcome<()>> {
        let outcome = self.menu.reload(&self.loader, class_id).await?;
        self.after_class_load(&outcome);
        Ok(outcome)
    }

    /// Reload the current class without changing the stored preference.
    pub async fn reload_class(&mut self) -> DirectoryResult<LoadOutcome<()>> {
        let class_id = self.require_class_id()?;
        self.open_classroom(&class_id).await
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.user_list.set_search(search);
    }

    pub fn select_tab(&mut self, kind: UserType) {
        self.user_list
            .select_tab(kind, self.menu.selected_class_mut());
        self.publish_selection();
    }

    pub fn switch_all(&mut self, value: Option<bool>) {
        if let Some(classroom) = self.menu.selected_class_mut() {
            self.user_list.switch_all(value, classroom);
        }
        self.publish_selection();
    }

    pub fn toggle_user(&mut self, user_id: &str) -> Option<bool> {
        let selected = self
            .menu
            .selected_class_mut()
            .and_then(|classroom| self.user_list.toggle_user(user_id, classroom));
        self.publish_selection();
        selected
    }

    pub fn sort_asc(&mut self, column: SortColumn) {
        self.user_list.sort_asc(column);
    }

    pub fn sort_desc(&mut self, column: SortColumn) {
        self.user_list.sort_desc(column);
    }

    /// Block or unblock the selected users.
    ///
    /// The roster reflects the new state even when some requests fail.
    pub async fn block_selection(&mut self, value: bool) -> DirectoryResult<()> {
        let classroom = self
            .menu
            .selected_class_mut()
            .ok_or(DirectoryError::NoActiveClassroom)?;

        let mut selection = selected_users(classroom);
        if selection.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = selection.iter().map(|user| user.id.clone()).collect();

        let result = self.service.block_users(value, &mut selection).await;
        for user in classroom.users.iter_mut().filter(|user| user.selected) {
            user.blocked = value;
        }

        self.publish_selection();
        self.emit(SessionEvent::UsersBlocked {
            ids,
            blocked: value,
        });
        result
    }

    /// Send reset instructions for the selected users to the operator's email.
    pub async fn reset_selection_passwords(&mut self) -> DirectoryResult<usize> {
        let email = self
            .operator
            .email
            .clone()
            .filter(|email| !email.is_empty())
            .ok_or(DirectoryError::MissingResetDestination)?;

        let selection = self.actions.selection().to_vec();
        self.service
            .reset_passwords(&selection, &ResetDestination::Email(email))
            .await?;
        Ok(selection.len())
    }

    /// Delete the selected accounts, refusing selections with protected accounts.
    pub async fn remove_selection(&mut self) -> DirectoryResult<Vec<String>> {
        if !self.actions.can_remove_selection() {
            return Err(DirectoryError::ProtectedSelection);
        }
        if !self.actions.has_selected_users() {
            return Ok(Vec::new());
        }

        let selection = self.actions.selection().to_vec();
        let ids = self.service.remove_users(&selection).await?;
        if let Some(classroom) = self.menu.selected_class_mut() {
            classroom.users.retain(|user| !ids.contains(&user.id));
        }

        self.publish_selection();
        self.emit(SessionEvent::UsersRemoved { ids: ids.clone() });
        Ok(ids)
    }

    /// Rename and/or relevel the current class.
    pub async fn save_class_infos(
        &mut self,
        name: Option<String>,
        level: Option<String>,
    ) -> DirectoryResult<()> {
        let classroom = self
            .menu
            .selected_class_mut()
            .ok_or(DirectoryError::NoActiveClassroom)?;
        classroom.update_data(ClassRoomPatch {
            name,
            level,
            ..ClassRoomPatch::default()
        });
        self.service.save_class_infos(classroom).await
    }

    /// Create an account in the current class and add it to the roster.
    pub async fn add_user(&mut self, mut user: User) -> DirectoryResult<User> {
        let class_id = self.require_class_id()?;
        self.service.add_user(&class_id, &mut user).await?;
        if let Some(classroom) = self.menu.selected_class_mut() {
            classroom.users.push(user.clone());
        }
        Ok(user)
    }

    /// Import a CSV file of `user_type` accounts into the current class, then reload it.
    ///
    /// Import failures are notified, not returned; only the reload can fail.
    pub async fn import_file(
        &mut self,
        file_name: impl Into<String>,
        contents: Vec<u8>,
        user_type: UserType,
    ) -> DirectoryResult<LoadOutcome<()>> {
        let classroom = self
            .menu
            .selected_class()
            .ok_or(DirectoryError::NoActiveClassroom)?;
        let request = ImportRequest {
            file_name: file_name.into(),
            contents,
            user_type,
            class_external_id: classroom.external_id.clone(),
        };

        self.service
            .import_file(request, self.notifier.as_ref(), self.translator.as_ref())
            .await;
        self.reload_class().await
    }
}
