use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classroom::ClassRoom;
use super::school::{School, SchoolRef};

/// Every school visible to one organisation, in API order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    pub schools: Vec<School>,
}

impl Network {
    /// Assemble the structure graph from the flat `/userbook/structures` listing.
    ///
    /// Each parent stub is resolved against the listed schools. A resolved stub
    /// is kept and the school is appended to the parent's `children`; a stub
    /// naming an unknown school is dropped. Schools left without any resolved
    /// parent end up with `parents == None`.
    pub fn from_flat_schools(mut schools: Vec<School>) -> Self {
        let positions: HashMap<String, usize> = schools
            .iter()
            .enumerate()
            .map(|(index, school)| (school.id.clone(), index))
            .collect();

        let mut links: Vec<(usize, SchoolRef)> = Vec::new();

        for school in schools.iter_mut() {
            let child = school.to_ref();
            let stubs = school.parents.take().unwrap_or_default();

            let resolved: Vec<SchoolRef> = stubs
                .into_iter()
                .filter(|stub| match positions.get(&stub.id) {
                    Some(&parent_index) => {
                        links.push((parent_index, child.clone()));
                        true
                    }
                    None => {
                        debug!(school = %child.id, parent = %stub.id, "dropping unresolved parent");
                        false
                    }
                })
                .collect();

            school.parents = if resolved.is_empty() {
                None
            } else {
                Some(resolved)
            };
        }

        for (parent_index, child) in links {
            if let Some(parent) = schools.get_mut(parent_index) {
                parent.children.push(child);
            }
        }

        Self { schools }
    }

    /// Classrooms of every school, flattened in school order.
    pub fn all_classrooms(&self) -> Vec<&ClassRoom> {
        self.schools
            .iter()
            .flat_map(|school| school.classrooms.iter())
            .collect()
    }

    /// Owning school of a classroom, found by scanning every school's classrooms.
    pub fn get_school_by_class_id(&self, class_id: &str) -> Option<&School> {
        self.schools.iter().find(|school| {
            school
                .classrooms
                .iter()
                .any(|classroom| classroom.id == class_id)
        })
    }

    pub fn school_by_id(&self, id: &str) -> Option<&School> {
        self.schools.iter().find(|school| school.id == id)
    }

    pub fn children_of<'a>(&'a self, school: &'a School) -> impl Iterator<Item = &'a School> + 'a {
        school
            .children
            .iter()
            .filter_map(move |child| self.school_by_id(&child.id))
    }

    pub fn parents_of<'a>(&'a self, school: &'a School) -> impl Iterator<Item = &'a School> + 'a {
        school
            .parents
            .iter()
            .flatten()
            .filter_map(move |parent| self.school_by_id(&parent.id))
    }

    pub fn belongs_to_multiple_schools(&self) -> bool {
        self.schools.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(id: &str, parents: &[&str]) -> School {
        let mut school = School::new(id, format!("School {id}"));
        school.parents = Some(parents.iter().map(|p| SchoolRef::new(*p)).collect());
        school
    }

    #[test]
    fn links_children_and_drops_unresolved_parents() {
        let network = Network::from_flat_schools(vec![
            school("A", &[]),
            school("B", &["A"]),
            school("C", &["Z"]),
        ]);

        let a = network.school_by_id("A").unwrap();
        let b = network.school_by_id("B").unwrap();
        let c = network.school_by_id("C").unwrap();

        let children: Vec<&str> = a.children.iter().map(|child| child.id.as_str()).collect();
        assert_eq!(children, vec!["B"]);
        assert!(a.parents.is_none());
        assert_eq!(b.parents.as_ref().map(Vec::len), Some(1));
        assert!(c.parents.is_none());
        assert!(c.children.is_empty());
    }

    #[test]
    fn supports_multiple_parents_and_children() {
        let network = Network::from_flat_schools(vec![
            school("A", &[]),
            school("B", &[]),
            school("C", &["A", "B", "missing"]),
            school("D", &["A"]),
        ]);

        let c = network.school_by_id("C").unwrap();
        let parent_ids: Vec<&str> = network.parents_of(c).map(|s| s.id.as_str()).collect();
        assert_eq!(parent_ids, vec!["A", "B"]);

        let a = network.school_by_id("A").unwrap();
        let child_ids: Vec<&str> = network.children_of(a).map(|s| s.id.as_str()).collect();
        assert_eq!(child_ids, vec!["C", "D"]);
        assert!(network.belongs_to_multiple_schools());
    }

    #[test]
    fn school_lookup_by_class_scans_all_schools() {
        let mut first = School::new("s1", "One");
        first.classrooms.push(ClassRoom::new("c1", "CP"));
        let mut second = School::new("s2", "Two");
        second.classrooms.push(ClassRoom::new("c2", "CE1"));
        second.classrooms.push(ClassRoom::new("c3", "CE2"));

        let network = Network::from_flat_schools(vec![first, second]);

        assert_eq!(network.all_classrooms().len(), 3);
        assert_eq!(network.get_school_by_class_id("c3").map(|s| s.id.as_str()), Some("s2"));
        assert!(network.get_school_by_class_id("nope").is_none());
    }
}
