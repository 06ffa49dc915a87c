//! Sequential recombination clustering with the `jetty` crate
//!
//! `jetty` finds which pseudojets get recombined at each step. The steps are
//! replayed into a clustering tree here, so that jets remember their tagged
//! constituents and can be declustered for grooming.

use super::{sort_by_pt, Clustering, Constituent, Jet, JetAlgorithm, JetDefinition, SoftDrop};
use crate::{
    momentum::{self, Momentum, E, X, Y, Z},
    numeric::Float,
};
use jetty::{anti_kt_f, cambridge_aachen_f, kt_f, ClusterHistory, ClusterStep, PseudoJet};
use noisy_float::types::n64;
use prefix_num_ops::real::*;

/// Radius used when reclustering a jet for grooming, large enough that the
/// whole jet ends up in a single tree
const RECLUSTER_RADIUS: Float = 1000.;

/// Sequential recombination clustering back-end
#[derive(Copy, Clone, Debug, Default)]
pub struct SequentialRecombination;
//
impl SequentialRecombination {
    /// Build the back-end
    pub fn new() -> Self {
        Self
    }
}

impl Clustering for SequentialRecombination {
    fn inclusive_jets(&self, inputs: &[Constituent], definition: &JetDefinition) -> Vec<Jet> {
        let tree = Tree::cluster(inputs, definition.algorithm, definition.radius);
        let min_pt2 = definition.min_pt * definition.min_pt;
        let mut jets = tree
            .roots
            .iter()
            .filter(|&&node| momentum::pt2(&tree.nodes[node].p) >= min_pt2)
            .map(|&node| tree.jet(node))
            .collect::<Vec<_>>();
        sort_by_pt(&mut jets);
        jets
    }

    fn soft_drop(&self, jet: &Jet, params: &SoftDrop) -> Jet {
        // Recluster the jet with Cambridge/Aachen to get an angular-ordered tree
        let tree = Tree::cluster(
            &jet.constituents,
            JetAlgorithm::CambridgeAachen,
            RECLUSTER_RADIUS,
        );
        let Some(mut node) = tree.roots.iter().copied().max_by(|&a, &b| {
            let pt_a = momentum::pt2(&tree.nodes[a].p);
            let pt_b = momentum::pt2(&tree.nodes[b].p);
            pt_a.total_cmp(&pt_b)
        }) else {
            return jet.clone();
        };

        // Walk down the declustering sequence, dropping the softer branch until
        // a splitting passes the symmetry condition
        while let Some((a, b)) = tree.nodes[node].children {
            let (p_a, p_b) = (&tree.nodes[a].p, &tree.nodes[b].p);
            let (pt_a, pt_b) = (momentum::pt(p_a), momentum::pt(p_b));
            let z = pt_a.min(pt_b) / (pt_a + pt_b);
            let delta_r = sqrt(momentum::delta_r2(p_a, p_b));
            if z > params.z_cut * (delta_r / params.r0).powf(params.beta) {
                break;
            }
            node = if pt_a >= pt_b { a } else { b };
        }
        tree.jet(node)
    }
}

/// Convert a 4-momentum into `jetty`'s representation
fn pseudojet(p: &Momentum) -> PseudoJet {
    [
        n64(f64::from(p[E])),
        n64(f64::from(p[X])),
        n64(f64::from(p[Y])),
        n64(f64::from(p[Z])),
    ]
    .into()
}

/// Node of the clustering tree: either an input particle or the
/// recombination of two earlier nodes
struct Node {
    p: Momentum,
    children: Option<(usize, usize)>,
    tag: usize,
}

/// Clustering tree
///
/// Node indices match `jetty`'s pseudojet indices: the inputs come first, in
/// input order, and every recombination appends one pseudojet.
///
struct Tree {
    nodes: Vec<Node>,
    /// Nodes that were declared inclusive jets, in clustering order
    roots: Vec<usize>,
}
//
impl Tree {
    /// Cluster tagged inputs with a given algorithm and radius
    fn cluster(inputs: &[Constituent], algorithm: JetAlgorithm, radius: Float) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(2 * inputs.len()),
            roots: Vec::new(),
        };
        tree.nodes.extend(inputs.iter().map(|c| Node {
            p: c.p,
            children: None,
            tag: c.tag,
        }));
        let partons = inputs.iter().map(|c| pseudojet(&c.p)).collect::<Vec<_>>();
        let r = f64::from(radius);
        match algorithm {
            JetAlgorithm::AntiKt => tree.replay(ClusterHistory::new(partons, &anti_kt_f(r))),
            JetAlgorithm::CambridgeAachen => {
                tree.replay(ClusterHistory::new(partons, &cambridge_aachen_f(r)))
            }
            JetAlgorithm::Kt => tree.replay(ClusterHistory::new(partons, &kt_f(r))),
        }
        tree
    }

    /// Record the steps of a clustering history
    fn replay(&mut self, history: impl IntoIterator<Item = ClusterStep>) {
        for step in history {
            match step {
                ClusterStep::Combine([i, j]) => {
                    // E-scheme recombination, same as jetty's
                    let p = self.nodes[i].p + self.nodes[j].p;
                    self.nodes.push(Node {
                        p,
                        children: Some((i, j)),
                        tag: usize::MAX,
                    });
                }
                ClusterStep::Jet(i) => self.roots.push(i),
            }
        }
    }

    /// Gather the input particles below a node as a jet
    fn jet(&self, root: usize) -> Jet {
        let mut constituents = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let node = &self.nodes[node];
            match node.children {
                // Push the second child first so the first one is visited first
                Some((first, second)) => {
                    stack.push(second);
                    stack.push(first);
                }
                None => constituents.push(Constituent {
                    p: node.p,
                    tag: node.tag,
                }),
            }
        }
        Jet {
            p: self.nodes[root].p,
            constituents,
        }
    }
}
