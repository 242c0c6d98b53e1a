//! Dependency DAG over a project's top-level tasks.
//!
//! The graph is an arena-indexed view: tasks are addressed by their position
//! in the project's task list, dependency edges resolve names to indices,
//! and successor lists are derived by inverting the dependency lists. The
//! task list's order doubles as a topological order because every dependency
//! must precede its dependent; a graph that builds successfully is therefore
//! acyclic by construction.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::task::TopLevelTask;

/// Index-based dependency graph, rebuilt from the task list on every use.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    dependencies: Vec<Vec<usize>>,
    successors: Vec<Vec<usize>>,
}

impl TaskGraph {
    /// Build the graph from a task list.
    ///
    /// Fails on duplicate task names and on dependencies that are missing,
    /// self-referential, or appear later in the list.
    pub fn build(tasks: &[TopLevelTask]) -> Result<Self, ValidationError> {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(tasks.len());
        let mut names = Vec::with_capacity(tasks.len());
        let mut dependencies = Vec::with_capacity(tasks.len());
        let mut successors = vec![Vec::new(); tasks.len()];

        for (i, task) in tasks.iter().enumerate() {
            // Resolve dependencies before registering the task itself, so a
            // self-dependency or a forward reference cannot resolve.
            let mut deps = Vec::with_capacity(task.dependencies.len());
            for dep_name in &task.dependencies {
                let dep = *index.get(dep_name).ok_or_else(|| {
                    ValidationError::InvalidDependency {
                        task: task.name.clone(),
                        dependency: dep_name.clone(),
                    }
                })?;
                deps.push(dep);
            }

            if index.insert(task.name.clone(), i).is_some() {
                return Err(ValidationError::DuplicateTask {
                    name: task.name.clone(),
                });
            }

            for &dep in &deps {
                successors[dep].push(i);
            }
            names.push(task.name.clone());
            dependencies.push(deps);
        }

        Ok(TaskGraph {
            names,
            index,
            dependencies,
            successors,
        })
    }

    /// Number of tasks in the graph.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the graph has no tasks.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a task name to its arena index.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the task at `index`.
    pub fn name_of(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Indices of the tasks `index` depends on. All strictly less than `index`.
    pub fn dependencies_of(&self, index: usize) -> &[usize] {
        &self.dependencies[index]
    }

    /// Indices of the tasks that depend on `index`. All strictly greater.
    pub fn successors_of(&self, index: usize) -> &[usize] {
        &self.successors[index]
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.dependencies.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Estimate;

    fn make_task(name: &str, deps: &[&str]) -> TopLevelTask {
        TopLevelTask::new(name, Estimate::new(1, 2, 3).unwrap())
            .with_dependencies(deps.iter().map(|d| d.to_string()).collect())
    }

    #[test]
    fn builds_chain_with_derived_successors() {
        let tasks = vec![
            make_task("design", &[]),
            make_task("build", &["design"]),
            make_task("ship", &["build"]),
        ];
        let graph = TaskGraph::build(&tasks).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.dependencies_of(1), &[0]);
        assert_eq!(graph.successors_of(0), &[1]);
        assert_eq!(graph.successors_of(2), &[] as &[usize]);
        assert_eq!(graph.index_of("ship"), Some(2));
        assert_eq!(graph.name_of(0), "design");
    }

    #[test]
    fn dependency_on_later_task_names_both_ends() {
        let tasks = vec![make_task("a", &["b"]), make_task("b", &[])];
        let err = TaskGraph::build(&tasks).unwrap_err();
        match err {
            ValidationError::InvalidDependency { task, dependency } => {
                assert_eq!(task, "a");
                assert_eq!(dependency, "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_dependency_is_rejected() {
        let tasks = vec![make_task("a", &[]), make_task("b", &["ghost"])];
        let err = TaskGraph::build(&tasks).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDependency { .. }));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let tasks = vec![make_task("a", &["a"])];
        let err = TaskGraph::build(&tasks).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDependency { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let tasks = vec![make_task("a", &[]), make_task("a", &[])];
        let err = TaskGraph::build(&tasks).unwrap_err();
        match err {
            ValidationError::DuplicateTask { name } => assert_eq!(name, "a"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_task_list_builds_an_empty_graph() {
        let graph = TaskGraph::build(&[]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn diamond_edges_are_symmetric() {
        let tasks = vec![
            make_task("a", &[]),
            make_task("b", &["a"]),
            make_task("c", &["a"]),
            make_task("d", &["b", "c"]),
        ];
        let graph = TaskGraph::build(&tasks).unwrap();

        for i in 0..graph.len() {
            for &dep in graph.dependencies_of(i) {
                assert!(dep < i);
                assert!(graph.successors_of(dep).contains(&i));
            }
            for &succ in graph.successors_of(i) {
                assert!(succ > i);
                assert!(graph.dependencies_of(succ).contains(&i));
            }
        }
    }
}
