//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and primitives are reordered at build time so
//! each leaf references a contiguous range. Splits use a binned surface area
//! heuristic on the longest centroid axis, with a median split fallback.

use std::cmp::Ordering;

use lumen_math::{Aabb, Interval, Vec3};

use crate::primitive::bounds_of;
use crate::{Hit, Primitive, Ray};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Number of buckets evaluated by the SAH.
const SAH_BINS: usize = 12;

/// Nodes deeper than this become leaves regardless of size, which bounds
/// the traversal stack.
const MAX_BUILD_DEPTH: usize = 48;

const TRAVERSAL_STACK_SIZE: usize = MAX_BUILD_DEPTH + 2;

/// Closest distance at which an intersection is accepted.
pub const MIN_HIT_DISTANCE: f32 = 1e-5;

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug, Clone, Copy)]
pub enum BvhNode {
    /// Internal node; children are indices into the node arena.
    Branch { bbox: Aabb, left: usize, right: usize },
    /// Leaf covering `primitives[first..first + count]`.
    Leaf { bbox: Aabb, first: usize, count: usize },
}

impl BvhNode {
    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }
}

/// Traversal cost of one query, reported by debug mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub nodes_visited: u32,
    pub primitive_tests: u32,
}

/// Per-primitive data used only while building.
#[derive(Clone, Copy)]
struct BuildItem {
    index: usize,
    bbox: Aabb,
    centroid: Vec3,
}

/// Spatial index over an immutable primitive list.
pub struct Bvh {
    nodes: Vec<BvhNode>,
    primitives: Vec<Box<dyn Primitive>>,
}

impl Bvh {
    /// Build a BVH owning `primitives`.
    pub fn new(primitives: Vec<Box<dyn Primitive>>) -> Self {
        if primitives.is_empty() {
            log::warn!("Building BVH over an empty scene; every ray will miss");
            return Self {
                nodes: Vec::new(),
                primitives,
            };
        }

        let mut items: Vec<BuildItem> = primitives
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let bbox = p.bounding_box();
                BuildItem {
                    index,
                    bbox,
                    centroid: bbox.centroid(),
                }
            })
            .collect();

        let mut nodes = Vec::with_capacity(2 * primitives.len());
        Self::build(&mut nodes, &mut items, 0, 0);

        // Reorder primitives to match leaf ranges
        let mut slots: Vec<Option<Box<dyn Primitive>>> = primitives.into_iter().map(Some).collect();
        let primitives: Vec<Box<dyn Primitive>> = items
            .iter()
            .filter_map(|item| slots[item.index].take())
            .collect();

        let bvh = Self { nodes, primitives };
        log::info!(
            "BVH built: {} primitives, {} nodes, depth {}",
            bvh.primitives.len(),
            bvh.nodes.len(),
            bvh.depth()
        );
        bvh
    }

    /// Recursive construction over `items`, which start at `offset` in the
    /// final primitive order. Returns the index of the created node.
    fn build(nodes: &mut Vec<BvhNode>, items: &mut [BuildItem], offset: usize, depth: usize) -> usize {
        let n = items.len();
        let bbox = items
            .iter()
            .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.bbox));

        let node_index = nodes.len();
        if n <= LEAF_MAX_SIZE || depth >= MAX_BUILD_DEPTH {
            nodes.push(BvhNode::Leaf {
                bbox,
                first: offset,
                count: n,
            });
            return node_index;
        }

        // Placeholder, patched once the children exist
        nodes.push(BvhNode::Leaf {
            bbox,
            first: offset,
            count: n,
        });

        let mid = Self::partition(items);
        let (left_items, right_items) = items.split_at_mut(mid);
        let left = Self::build(nodes, left_items, offset, depth + 1);
        let right = Self::build(nodes, right_items, offset + mid, depth + 1);

        nodes[node_index] = BvhNode::Branch { bbox, left, right };
        node_index
    }

    /// Reorder `items` into two non-empty halves and return the split point.
    fn partition(items: &mut [BuildItem]) -> usize {
        let n = items.len();
        let centroid_bounds = items
            .iter()
            .fold(Aabb::EMPTY, |acc, item| acc.include_point(item.centroid));
        let axis = centroid_bounds.longest_axis();
        let extent = centroid_bounds.axis_interval(axis);

        if extent.size() > 1e-6 {
            if let Some(mid) = Self::partition_sah(items, axis, extent) {
                return mid;
            }
        }

        // Median split along the axis
        let mid = n / 2;
        items.select_nth_unstable_by(mid, |a, b| {
            a.centroid[axis]
                .partial_cmp(&b.centroid[axis])
                .unwrap_or(Ordering::Equal)
        });
        mid
    }

    /// Binned SAH split. Returns `None` when no bin boundary separates the
    /// items.
    fn partition_sah(items: &mut [BuildItem], axis: usize, extent: Interval) -> Option<usize> {
        let bin_of = |item: &BuildItem| -> usize {
            let relative = (item.centroid[axis] - extent.min) / extent.size();
            ((relative * SAH_BINS as f32) as usize).min(SAH_BINS - 1)
        };

        let mut bin_bounds = [Aabb::EMPTY; SAH_BINS];
        let mut bin_counts = [0usize; SAH_BINS];
        for item in items.iter() {
            let b = bin_of(item);
            bin_counts[b] += 1;
            bin_bounds[b] = Aabb::surrounding(&bin_bounds[b], &item.bbox);
        }

        // Sweep from the right to get suffix areas and counts
        let mut right_area = [0.0f32; SAH_BINS];
        let mut right_count = [0usize; SAH_BINS];
        let mut acc = Aabb::EMPTY;
        let mut count = 0;
        for b in (1..SAH_BINS).rev() {
            acc = Aabb::surrounding(&acc, &bin_bounds[b]);
            count += bin_counts[b];
            right_area[b] = acc.surface_area();
            right_count[b] = count;
        }

        let mut best: Option<(usize, f32)> = None;
        let mut acc = Aabb::EMPTY;
        let mut count = 0;
        for split in 1..SAH_BINS {
            acc = Aabb::surrounding(&acc, &bin_bounds[split - 1]);
            count += bin_counts[split - 1];
            if count == 0 || right_count[split] == 0 {
                continue;
            }
            let cost = acc.surface_area() * count as f32 + right_area[split] * right_count[split] as f32;
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((split, cost));
            }
        }

        let (split, _) = best?;
        let mut mid = 0;
        for j in 0..items.len() {
            if bin_of(&items[j]) < split {
                items.swap(mid, j);
                mid += 1;
            }
        }
        (mid > 0 && mid < items.len()).then_some(mid)
    }

    /// Nearest hit along the ray; `t = +inf` when nothing is hit.
    pub fn intersect(&self, ray: &Ray) -> Hit<'_> {
        let mut stats = TraversalStats::default();
        self.traverse(ray, Interval::new(MIN_HIT_DISTANCE, f32::INFINITY), false, &mut stats)
    }

    /// True if any primitive is hit strictly closer than `max_distance`.
    pub fn occluded(&self, ray: &Ray, max_distance: f32) -> bool {
        let mut stats = TraversalStats::default();
        self.traverse(ray, Interval::new(MIN_HIT_DISTANCE, max_distance), true, &mut stats)
            .is_hit()
    }

    /// Nearest hit together with the work the traversal did to find it.
    pub fn traversal_cost(&self, ray: &Ray) -> (Hit<'_>, TraversalStats) {
        let mut stats = TraversalStats::default();
        let hit = self.traverse(ray, Interval::new(MIN_HIT_DISTANCE, f32::INFINITY), false, &mut stats);
        (hit, stats)
    }

    fn traverse(&self, ray: &Ray, ray_t: Interval, any_hit: bool, stats: &mut TraversalStats) -> Hit<'_> {
        let mut closest = Hit::default();
        let Some(root) = self.nodes.first() else {
            return closest;
        };
        let Some(root_entry) = root.bounding_box().intersect(ray, ray_t) else {
            return closest;
        };

        let mut interval = ray_t;
        let mut stack = [(0usize, 0.0f32); TRAVERSAL_STACK_SIZE];
        stack[0] = (0, root_entry);
        let mut sp = 1;

        while sp > 0 {
            sp -= 1;
            let (index, entry) = stack[sp];
            // A closer hit was found after this node was queued
            if entry >= interval.max {
                continue;
            }
            stats.nodes_visited += 1;

            match self.nodes[index] {
                BvhNode::Leaf { first, count, .. } => {
                    for primitive in &self.primitives[first..first + count] {
                        stats.primitive_tests += 1;
                        if primitive.hit(ray, interval, &mut closest) {
                            if any_hit {
                                return closest;
                            }
                            interval = interval.with_max(closest.t);
                        }
                    }
                }
                BvhNode::Branch { left, right, .. } => {
                    let left_entry = self.nodes[left].bounding_box().intersect(ray, interval);
                    let right_entry = self.nodes[right].bounding_box().intersect(ray, interval);

                    // Push the far child first so the near one is popped next
                    match (left_entry, right_entry) {
                        (Some(tl), Some(tr)) => {
                            let (near, far) = if tl <= tr {
                                ((left, tl), (right, tr))
                            } else {
                                ((right, tr), (left, tl))
                            };
                            stack[sp] = far;
                            stack[sp + 1] = near;
                            sp += 2;
                        }
                        (Some(tl), None) => {
                            stack[sp] = (left, tl);
                            sp += 1;
                        }
                        (None, Some(tr)) => {
                            stack[sp] = (right, tr);
                            sp += 1;
                        }
                        (None, None) => {}
                    }
                }
            }
        }

        closest
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn bounding_box(&self) -> Aabb {
        self.nodes
            .first()
            .map_or_else(|| bounds_of(&self.primitives), BvhNode::bounding_box)
    }

    /// Depth of the tree (a single leaf has depth 1, empty has depth 0).
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[BvhNode], index: usize) -> usize {
            match nodes[index] {
                BvhNode::Leaf { .. } => 1,
                BvhNode::Branch { left, right, .. } => 1 + depth_of(nodes, left).max(depth_of(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            depth_of(&self.nodes, 0)
        }
    }
}
