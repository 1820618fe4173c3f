//! Validates the accumulated descriptor lists for one pass.
//!
//! Format and uniqueness violations and dependency cycles are hard errors
//! that abort generation; range and missing-dependency findings only warn.

use crate::config::ProcessorOptions;
use crate::diag::Diagnostics;
use crate::error::{ProcessorError, Result};
use crate::extract::{MODULE_PRIORITY_MAX, PROVIDER_PRIORITY_MAX, VERSION_RE};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use std::collections::HashSet;
use wireup_api::models::{ModuleDescriptor, ProviderDescriptor};

static TYPE_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][a-zA-Z0-9_.]*$").expect("type path regex"));
// Provider module references may carry hyphens; type paths may not.
static MODULE_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][a-zA-Z0-9_-]*$").expect("module ref regex"));

pub struct Validator<'a> {
    options: &'a ProcessorOptions,
    diag: &'a Diagnostics,
}

impl<'a> Validator<'a> {
    pub fn new(options: &'a ProcessorOptions, diag: &'a Diagnostics) -> Self {
        Self { options, diag }
    }

    pub fn validate(
        &self,
        providers: &[ProviderDescriptor],
        modules: &[ModuleDescriptor],
    ) -> Result<()> {
        self.check_formats(providers, modules)?;
        self.check_uniqueness(providers, modules)?;
        self.check_ranges(providers, modules);
        if self.options.validate_dependencies {
            self.check_dependency_existence(providers);
        }
        self.check_cycles(providers, modules)?;
        Ok(())
    }

    fn check_formats(
        &self,
        providers: &[ProviderDescriptor],
        modules: &[ModuleDescriptor],
    ) -> Result<()> {
        for provider in providers {
            if provider.implementation_id.trim().is_empty() {
                return Err(ProcessorError::Validation(
                    "provider implementation id must not be blank".to_string(),
                ));
            }
            if !TYPE_PATH_RE.is_match(&provider.implementation_id) {
                return Err(ProcessorError::Validation(format!(
                    "malformed provider implementation id '{}'",
                    provider.implementation_id
                )));
            }
            for interface_name in &provider.interfaces {
                if interface_name.trim().is_empty() || !TYPE_PATH_RE.is_match(interface_name) {
                    return Err(ProcessorError::Validation(format!(
                        "provider {} declares a malformed interface name '{interface_name}'",
                        provider.implementation_id
                    )));
                }
            }
            if !provider.module.is_empty() && !MODULE_REF_RE.is_match(&provider.module) {
                return Err(ProcessorError::Validation(format!(
                    "provider {} references a malformed module id '{}'",
                    provider.implementation_id, provider.module
                )));
            }
            for dependency in &provider.dependencies {
                if dependency.trim().is_empty() {
                    return Err(ProcessorError::Validation(format!(
                        "provider {} declares an empty dependency entry",
                        provider.implementation_id
                    )));
                }
            }
        }

        for module in modules {
            if module.name.trim().is_empty() {
                return Err(ProcessorError::Validation(format!(
                    "module {} has a blank name",
                    module.implementation_id
                )));
            }
            if module.implementation_id.trim().is_empty()
                || !TYPE_PATH_RE.is_match(&module.implementation_id)
            {
                return Err(ProcessorError::Validation(format!(
                    "malformed module implementation id '{}'",
                    module.implementation_id
                )));
            }
            for dependency in &module.dependencies {
                if dependency.trim().is_empty() {
                    return Err(ProcessorError::Validation(format!(
                        "module '{}' declares an empty dependency entry",
                        module.name
                    )));
                }
            }
        }

        Ok(())
    }

    fn check_uniqueness(
        &self,
        providers: &[ProviderDescriptor],
        modules: &[ModuleDescriptor],
    ) -> Result<()> {
        let duplicate_providers = duplicate_keys(providers.iter().map(|p| &p.implementation_id));
        if !duplicate_providers.is_empty() {
            return Err(ProcessorError::Validation(format!(
                "duplicate provider implementation id(s): {}",
                duplicate_providers.join(", ")
            )));
        }

        let duplicate_modules = duplicate_keys(modules.iter().map(|m| &m.name));
        if !duplicate_modules.is_empty() {
            return Err(ProcessorError::Validation(format!(
                "duplicate module name(s): {}",
                duplicate_modules.join(", ")
            )));
        }

        Ok(())
    }

    fn check_ranges(&self, providers: &[ProviderDescriptor], modules: &[ModuleDescriptor]) {
        for provider in providers {
            if provider.priority > PROVIDER_PRIORITY_MAX {
                self.diag.warn(&format!(
                    "provider {} priority {} is outside the recommended range [0, {PROVIDER_PRIORITY_MAX}]",
                    provider.implementation_id, provider.priority
                ));
            }
        }
        for module in modules {
            if module.priority > MODULE_PRIORITY_MAX {
                self.diag.warn(&format!(
                    "module '{}' priority {} is outside the recommended range [0, {MODULE_PRIORITY_MAX}]",
                    module.name, module.priority
                ));
            }
            if !VERSION_RE.is_match(&module.version) {
                self.diag.warn(&format!(
                    "module '{}' version '{}' does not follow MAJOR.MINOR.PATCH",
                    module.name, module.version
                ));
            }
        }
    }

    /// Soft check: each provider dependency should appear among the declared
    /// provider interfaces. Misses warn and are counted, never abort.
    fn check_dependency_existence(&self, providers: &[ProviderDescriptor]) {
        let available: HashSet<&str> = providers
            .iter()
            .flat_map(|p| p.interfaces.iter().map(String::as_str))
            .collect();

        let mut missing = 0usize;
        for provider in providers {
            for dependency in &provider.dependencies {
                if !available.contains(dependency.as_str()) {
                    self.diag.warn(&format!(
                        "provider {} depends on {dependency}, but no provider declares it",
                        provider.implementation_id
                    ));
                    missing += 1;
                }
            }
        }

        if missing > 0 {
            self.diag
                .warn(&format!("found {missing} missing dependency(ies)"));
        } else {
            self.diag.info("all provider dependencies resolved");
        }
    }

    fn check_cycles(
        &self,
        providers: &[ProviderDescriptor],
        modules: &[ModuleDescriptor],
    ) -> Result<()> {
        self.diag.info("checking for dependency cycles...");
        let graph = DependencyGraph::build(providers, modules);
        let cycles = graph.find_cycles();

        if cycles.is_empty() {
            self.diag.info("no dependency cycles found");
            return Ok(());
        }

        let mut rendered = Vec::with_capacity(cycles.len());
        for cycle in &cycles {
            let mut path = cycle.join(" -> ");
            if let Some(first) = cycle.first() {
                path.push_str(" -> ");
                path.push_str(first);
            }
            self.diag.error(&format!("dependency cycle: {path}"));
            rendered.push(path);
        }

        Err(ProcessorError::DependencyCycle(format!(
            "found {} cycle(s): {}",
            cycles.len(),
            rendered.join("; ")
        )))
    }
}

fn duplicate_keys<'k>(keys: impl Iterator<Item = &'k String>) -> Vec<String> {
    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    for key in keys {
        *seen.entry(key.as_str()).or_insert(0) += 1;
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key.to_string())
        .collect()
}

/// Directed dependency graph over provider interfaces, provider
/// implementation ids and module implementation ids.
///
/// Interface names, implementation ids and plain dependency strings share
/// one node namespace; a dependency string resolves to whichever node
/// happens to carry the same spelling. This conflation is part of the
/// established registry semantics and is kept as-is.
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    nodes: IndexMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn build(providers: &[ProviderDescriptor], modules: &[ModuleDescriptor]) -> Self {
        let mut builder = Self {
            graph: DiGraph::new(),
            nodes: IndexMap::new(),
        };
        // Ids that already received their dependency edges as a source.
        let mut sources: HashSet<String> = HashSet::new();

        for provider in providers {
            for interface_name in &provider.interfaces {
                for dependency in &provider.dependencies {
                    builder.edge(interface_name, dependency);
                }
                builder.node(interface_name);
                sources.insert(interface_name.clone());
            }
            // The implementation id itself joins the graph unless an
            // identically-spelled interface already did.
            if !sources.contains(&provider.implementation_id) {
                for dependency in &provider.dependencies {
                    builder.edge(&provider.implementation_id, dependency);
                }
                builder.node(&provider.implementation_id);
                sources.insert(provider.implementation_id.clone());
            }
        }

        for module in modules {
            for dependency in &module.dependencies {
                builder.edge(&module.implementation_id, dependency);
            }
            builder.node(&module.implementation_id);
        }

        builder
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.nodes.insert(id.to_string(), idx);
        idx
    }

    fn edge(&mut self, from: &str, to: &str) {
        let from_idx = self.node(from);
        let to_idx = self.node(to);
        self.graph.update_edge(from_idx, to_idx, ());
    }

    /// Iterative depth-first traversal from every unvisited node, in node
    /// insertion order. A neighbor already on the recursion stack closes a
    /// cycle; the recorded cycle is the path slice from that neighbor's
    /// first occurrence to the current frame. At most one cycle is recorded
    /// per traversal root.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        for &root in self.nodes.values() {
            if visited.contains(&root) {
                continue;
            }

            let mut frames: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
            let mut on_stack: HashSet<NodeIndex> = HashSet::new();
            let mut path: Vec<NodeIndex> = Vec::new();

            visited.insert(root);
            on_stack.insert(root);
            path.push(root);
            frames.push((root, self.neighbors_in_order(root), 0));

            'dfs: loop {
                let next = {
                    let Some((_, neighbors, cursor)) = frames.last_mut() else {
                        break 'dfs;
                    };
                    if *cursor < neighbors.len() {
                        let n = neighbors[*cursor];
                        *cursor += 1;
                        Some(n)
                    } else {
                        None
                    }
                };

                match next {
                    Some(next) => {
                        if on_stack.contains(&next) {
                            let start = path.iter().position(|&n| n == next).unwrap_or(0);
                            cycles.push(
                                path[start..]
                                    .iter()
                                    .map(|&n| self.graph[n].clone())
                                    .collect(),
                            );
                            break 'dfs;
                        }
                        if !visited.contains(&next) {
                            visited.insert(next);
                            on_stack.insert(next);
                            path.push(next);
                            frames.push((next, self.neighbors_in_order(next), 0));
                        }
                    }
                    None => {
                        if let Some((done, _, _)) = frames.pop() {
                            on_stack.remove(&done);
                            path.pop();
                        }
                    }
                }
            }
        }

        cycles
    }

    /// Petgraph yields neighbors in reverse insertion order; flip them so
    /// traversal follows declaration order.
    fn neighbors_in_order(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.reverse();
        neighbors
    }
}
