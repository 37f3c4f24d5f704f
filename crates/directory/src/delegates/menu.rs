use tracing::{debug, warn};

use crate::context::{Operator, PreferenceStore, SELECTED_CLASS_PREFERENCE};
use crate::entities::{ClassRoom, Network};
use crate::services::{ClassLoader, LoadOutcome};
use crate::types::{DirectoryError, DirectoryResult};

/// Slot key under which the current class load is tracked.
pub const SELECTED_CLASS_SLOT: &str = "selected-class";

/// Pick the classroom to open when the session starts.
///
/// The stored preference wins when it names a classroom of the network (any
/// non-empty preference is accepted while the network is unknown); otherwise
/// the operator's first classroom is used.
pub fn resolve_initial_class(
    preference: Option<&str>,
    operator: &Operator,
    network: Option<&Network>,
) -> Option<String> {
    let stored = preference.filter(|id| !id.is_empty()).filter(|id| {
        network.map_or(true, |network| network.get_school_by_class_id(id).is_some())
    });

    match stored {
        Some(id) => Some(id.to_string()),
        None => operator.classes.first().cloned(),
    }
}

/// Holds the current classroom and the classroom menu.
#[derive(Debug, Default)]
pub struct MenuDelegate {
    network: Option<Network>,
    classrooms: Vec<ClassRoom>,
    selected_class: Option<ClassRoom>,
    list_opened: bool,
}

impl MenuDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the network and list the operator's classrooms from it.
    pub fn on_network_loaded(&mut self, network: Network, operator: &Operator) {
        self.classrooms = network
            .all_classrooms()
            .into_iter()
            .filter(|classroom| operator.classes.contains(&classroom.id))
            .cloned()
            .collect();
        debug!(classrooms = self.classrooms.len(), "operator classrooms listed");
        self.network = Some(network);
    }

    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    pub fn classrooms(&self) -> &[ClassRoom] {
        &self.classrooms
    }

    pub fn selected_class(&self) -> Option<&ClassRoom> {
        self.selected_class.as_ref()
    }

    pub fn selected_class_mut(&mut self) -> Option<&mut ClassRoom> {
        self.selected_class.as_mut()
    }

    pub fn selected_class_id(&self) -> Option<&str> {
        self.selected_class
            .as_ref()
            .map(|classroom| classroom.id.as_str())
    }

    pub fn set_selected_class(&mut self, classroom: Option<ClassRoom>) {
        self.selected_class = classroom;
    }

    /// Persist `class_id` as the selected class and load it with its roster.
    ///
    /// An empty id clears the selection. A load overtaken by a newer one
    /// leaves the selection untouched.
    pub async fn select_classroom(
        &mut self,
        class_id: &str,
        preferences: &dyn PreferenceStore,
        loader: &ClassLoader,
    ) -> DirectoryResult<LoadOutcome<()>> {
        if class_id.is_empty() {
            warn!("trying to select an undefined classroom");
            self.selected_class = None;
            return Err(DirectoryError::NoActiveClassroom);
        }

        preferences.save(SELECTED_CLASS_PREFERENCE, class_id).await?;
        self.list_opened = false;
        self.reload(loader, class_id).await
    }

    /// Load `class_id` into the selection without touching the preference.
    pub async fn reload(
        &mut self,
        loader: &ClassLoader,
        class_id: &str,
    ) -> DirectoryResult<LoadOutcome<()>> {
        match loader.load(SELECTED_CLASS_SLOT, class_id).await? {
            LoadOutcome::Applied(classroom) => {
                debug!(class_id, users = classroom.users.len(), "class selected");
                self.selected_class = Some(classroom);
                Ok(LoadOutcome::Applied(()))
            }
            LoadOutcome::Superseded => Ok(LoadOutcome::Superseded),
        }
    }

    /// Name of the school owning `class_id`.
    pub fn selected_school(&self, class_id: &str) -> Option<&str> {
        self.network
            .as_ref()?
            .get_school_by_class_id(class_id)
            .map(|school| school.name.as_str())
    }

    pub fn belongs_to_multiple_schools(&self) -> bool {
        self.network
            .as_ref()
            .is_some_and(Network::belongs_to_multiple_schools)
    }

    pub fn toggle_class_list(&mut self) {
        self.list_opened = !self.list_opened;
    }

    pub fn list_opened(&self) -> bool {
        self.list_opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MockPreferenceStore;
    use crate::entities::School;
    use classadmin_config::ApiConfig;
    use crate::services::DirectoryService;

    fn operator(classes: &[&str]) -> Operator {
        Operator {
            classes: classes.iter().map(|id| id.to_string()).collect(),
            ..Operator::default()
        }
    }

    fn network() -> Network {
        let mut first = School::new("s1", "Jules Ferry");
        first.classrooms = vec![ClassRoom::new("c1", "CP"), ClassRoom::new("c2", "CE1")];
        let mut second = School::new("s2", "Victor Hugo");
        second.classrooms = vec![ClassRoom::new("c3", "CM2")];
        Network::from_flat_schools(vec![first, second])
    }

    #[test]
    fn initial_class_prefers_valid_preference() {
        let network = network();
        let me = operator(&["c2", "c3"]);

        assert_eq!(
            resolve_initial_class(Some("c3"), &me, Some(&network)).as_deref(),
            Some("c3")
        );
        assert_eq!(
            resolve_initial_class(Some("gone"), &me, Some(&network)).as_deref(),
            Some("c2")
        );
        assert_eq!(
            resolve_initial_class(Some(""), &me, None).as_deref(),
            Some("c2")
        );
        assert_eq!(
            resolve_initial_class(Some("gone"), &me, None).as_deref(),
            Some("gone")
        );
        assert_eq!(resolve_initial_class(None, &operator(&[]), None), None);
    }

    #[test]
    fn network_load_lists_operator_classrooms() {
        let mut menu = MenuDelegate::new();
        menu.on_network_loaded(network(), &operator(&["c3", "c1"]));

        let ids: Vec<&str> = menu.classrooms().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
        assert_eq!(menu.selected_school("c3"), Some("Victor Hugo"));
        assert!(menu.belongs_to_multiple_schools());
    }

    #[test]
    fn toggling_class_list() {
        let mut menu = MenuDelegate::new();
        assert!(!menu.list_opened());
        menu.toggle_class_list();
        assert!(menu.list_opened());
    }

    #[tokio::test]
    async fn selecting_empty_class_clears_selection_without_saving() {
        let mut preferences = MockPreferenceStore::new();
        preferences.expect_save().never();

        let service = DirectoryService::new(&ApiConfig::default()).unwrap();
        let loader = ClassLoader::new(service);

        let mut menu = MenuDelegate::new();
        menu.set_selected_class(Some(ClassRoom::new("c1", "CP")));

        let result = menu.select_classroom("", &preferences, &loader).await;
        assert!(matches!(result, Err(DirectoryError::NoActiveClassroom)));
        assert!(menu.selected_class().is_none());
    }

    #[tokio::test]
    async fn preference_failures_abort_selection() {
        let mut preferences = MockPreferenceStore::new();
        preferences
            .expect_save()
            .times(1)
            .returning(|_, _| Err(DirectoryError::preferences("read-only store")));

        let service = DirectoryService::new(&ApiConfig::default()).unwrap();
        let loader = ClassLoader::new(service);

        let mut menu = MenuDelegate::new();
        let result = menu.select_classroom("c1", &preferences, &loader).await;
        assert!(matches!(result, Err(DirectoryError::Preferences { .. })));
        assert!(menu.selected_class().is_none());
    }
}
