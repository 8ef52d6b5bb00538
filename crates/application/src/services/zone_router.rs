use super::script_host::ScriptHost;
use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use scriptdns_domain::{DomainName, ZoneName};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct TrieNode {
    children: HashMap<CompactString, TrieNode, FxBuildHasher>,
    host: Option<usize>,
}

/// Maps query names to the script host of the longest matching zone.
///
/// Zones are stored in a trie keyed by labels in reverse order, so a lookup
/// walks from the TLD towards the leftmost label and remembers the deepest
/// node that owns a zone. Matching is on whole labels: `badexample.com` never
/// matches the zone `example.com`.
pub struct ZoneRouter {
    root: TrieNode,
    hosts: Vec<Arc<ScriptHost>>,
}

impl ZoneRouter {
    pub fn new(hosts: Vec<Arc<ScriptHost>>) -> Self {
        let mut root = TrieNode::default();

        for (index, host) in hosts.iter().enumerate() {
            let mut node = &mut root;
            if let ZoneName::Suffix(zone) = host.zone() {
                for label in zone.labels().rev() {
                    node = node.children.entry(CompactString::new(label)).or_default();
                }
            }
            node.host = Some(index);
        }

        Self { root, hosts }
    }

    #[inline]
    pub fn route(&self, domain: &DomainName) -> Option<&Arc<ScriptHost>> {
        let labels: SmallVec<[&str; 8]> = domain.labels().rev().collect();
        let mut node = &self.root;
        let mut best = node.host;

        for label in &labels {
            match node.children.get(*label) {
                Some(child) => {
                    if child.host.is_some() {
                        best = child.host;
                    }
                    node = child;
                }
                None => break,
            }
        }

        best.and_then(|index| self.hosts.get(index))
    }

    pub fn get(&self, zone: &ZoneName) -> Option<&Arc<ScriptHost>> {
        self.hosts.iter().find(|host| host.zone() == zone)
    }

    pub fn hosts(&self) -> &[Arc<ScriptHost>] {
        &self.hosts
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
