//! ECS components for parent/child transform hierarchies.
//!
//! This module resolves world-space transforms for entities in a `hecs` [`World`].
//! Entities carry their local [`Transform`]; a [`Parent`] component links a child to
//! its parent entity. [`propagate_transforms`] walks those links and writes a
//! [`GlobalTransform`] on every entity that has a `Transform`.
//!
//! # Example
//!
//! ```
//! use rigid3d::hierarchy::{GlobalTransform, Parent, propagate_transforms};
//! use rigid3d::{Transform, Vec3, World};
//!
//! let mut world = World::new();
//! let body = world.spawn((Transform::from_position(Vec3::new(0.0, 0.0, -5.0)),));
//! let arm = world.spawn((Transform::from_position(Vec3::X), Parent(body)));
//!
//! propagate_transforms(&mut world);
//!
//! let global = world.get::<&GlobalTransform>(arm).unwrap();
//! assert_eq!(global.0.position, Vec3::new(1.0, 0.0, -5.0));
//! ```

use std::collections::{HashMap, HashSet};

use hecs::{Entity, World};
use log::warn;

use crate::transform::Transform;

/// Links an entity to its parent. The entity's [`Transform`] is relative to the parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Parent(pub Entity);

/// World-space transform written by [`propagate_transforms`].
///
/// Reading it before the first propagation, or after changing a local
/// [`Transform`] without propagating again, yields a stale value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalTransform(pub Transform);

/// Recomputes [`GlobalTransform`] for every entity that has a [`Transform`].
///
/// Each global is `local * parent_global`, with roots using their local transform
/// as is. Returns the number of entities updated. Entities that still carry a
/// `GlobalTransform` but no longer have a `Transform` lose the stale global.
///
/// Broken links never abort propagation:
/// - a [`Parent`] that was despawned or has no `Transform` makes the child a root;
/// - a cycle of `Parent` links is cut at the link that closes the loop.
///
/// Both cases are reported with `log::warn!`.
pub fn propagate_transforms(world: &mut World) -> usize {
    let locals: HashMap<Entity, (Transform, Option<Entity>)> = world
        .query::<(&Transform, Option<&Parent>)>()
        .iter()
        .map(|(entity, (local, parent))| (entity, (*local, parent.map(|p| p.0))))
        .collect();

    let mut resolved = HashMap::with_capacity(locals.len());
    for (&entity, &(local, parent)) in &locals {
        resolve(entity, local, parent, &locals, &mut resolved);
    }

    let stale: Vec<Entity> = world
        .query::<(&GlobalTransform, Option<&Transform>)>()
        .iter()
        .filter(|(_, (_, local))| local.is_none())
        .map(|(entity, _)| entity)
        .collect();
    for entity in stale {
        if let Err(err) = world.remove_one::<GlobalTransform>(entity) {
            warn!("Could not remove stale global transform from {entity:?}: {err}");
        }
    }

    let mut updated = 0;
    for (entity, global) in resolved {
        match world.insert_one(entity, GlobalTransform(global)) {
            Ok(()) => updated += 1,
            Err(err) => warn!("Could not store global transform for {entity:?}: {err}"),
        }
    }
    updated
}

/// Resolves `entity` and every unresolved ancestor above it.
fn resolve(
    entity: Entity,
    local: Transform,
    parent: Option<Entity>,
    locals: &HashMap<Entity, (Transform, Option<Entity>)>,
    resolved: &mut HashMap<Entity, Transform>,
) {
    // Walk up until a resolved ancestor, a root, or a broken link
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut base = None;
    let mut next = Some((entity, local, parent));

    while let Some((current, local, parent)) = next {
        if let Some(global) = resolved.get(&current) {
            base = Some(*global);
            break;
        }
        if !visited.insert(current) {
            warn!(
                "Parent cycle through {current:?}; treating {entity:?}'s topmost ancestor as a root"
            );
            break;
        }
        chain.push((current, local));

        next = match parent {
            None => None,
            Some(parent) => match locals.get(&parent) {
                Some(&(local, grandparent)) => Some((parent, local, grandparent)),
                None => {
                    warn!(
                        "{current:?} has parent {parent:?} with no Transform; treating it as a root"
                    );
                    None
                }
            },
        };
    }

    let mut parent_global = base;
    for (link, local) in chain.into_iter().rev() {
        let global = match parent_global {
            Some(parent) => local * parent,
            None => local,
        };
        resolved.insert(link, global);
        parent_global = Some(global);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quaternion::Quaternion;
    use approx::assert_abs_diff_eq;
    use glam::Vec3;
    use std::f32::consts::FRAC_PI_2;

    fn global(world: &World, entity: Entity) -> Transform {
        world.get::<&GlobalTransform>(entity).unwrap().0
    }

    #[test]
    fn roots_copy_their_local_transform() {
        let mut world = World::new();
        let local = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).uniform_scale(2.0);
        let root = world.spawn((local,));

        assert_eq!(propagate_transforms(&mut world), 1);
        assert_eq!(global(&world, root), local);
    }

    #[test]
    fn grandchild_composes_whole_chain() {
        let mut world = World::new();
        let root_local = Transform::from_trs(
            Vec3::new(0.0, 0.0, -5.0),
            Quaternion::angle_axis(FRAC_PI_2, Vec3::Y).unwrap(),
            Vec3::splat(2.0),
        );
        let mid_local = Transform::from_position(Vec3::X);
        let leaf_local = Transform::from_position(Vec3::Y).uniform_scale(0.5);

        let root = world.spawn((root_local,));
        let mid = world.spawn((mid_local, Parent(root)));
        let leaf = world.spawn((leaf_local, Parent(mid)));

        assert_eq!(propagate_transforms(&mut world), 3);

        let expected = leaf_local * mid_local * root_local;
        let leaf_global = global(&world, leaf);
        assert_abs_diff_eq!(leaf_global.position, expected.position, epsilon = 1e-5);
        assert_abs_diff_eq!(leaf_global.scale, Vec3::ONE, epsilon = 1e-6);

        // Same result as mapping the leaf origin through each level
        let by_points = root_local.transform_point(mid_local.transform_point(leaf_local.position));
        assert_abs_diff_eq!(leaf_global.position, by_points, epsilon = 1e-5);
        assert_abs_diff_eq!(
            global(&world, mid).position,
            Vec3::new(0.0, 0.0, -7.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn entities_without_transform_are_ignored() {
        let mut world = World::new();
        world.spawn((42u32,));
        let root = world.spawn((Transform::new(),));

        assert_eq!(propagate_transforms(&mut world), 1);
        assert_eq!(global(&world, root), Transform::new());
    }

    #[test]
    fn despawned_parent_makes_child_a_root() {
        let mut world = World::new();
        let parent = world.spawn((Transform::from_position(Vec3::X),));
        let local = Transform::from_position(Vec3::Y);
        let child = world.spawn((local, Parent(parent)));
        world.despawn(parent).unwrap();

        assert_eq!(propagate_transforms(&mut world), 1);
        assert_eq!(global(&world, child), local);
    }

    #[test]
    fn parent_cycles_terminate() {
        let mut world = World::new();
        let a = world.spawn((Transform::from_position(Vec3::X),));
        let b = world.spawn((Transform::from_position(Vec3::Y), Parent(a)));
        world.insert_one(a, Parent(b)).unwrap();

        assert_eq!(propagate_transforms(&mut world), 2);
        // Whichever entity is resolved first ends up on top of the other
        let (ga, gb) = (global(&world, a).position, global(&world, b).position);
        let a_on_b = ga == Vec3::new(1.0, 1.0, 0.0) && gb == Vec3::Y;
        let b_on_a = gb == Vec3::new(1.0, 1.0, 0.0) && ga == Vec3::X;
        assert!(a_on_b || b_on_a, "a: {ga}, b: {gb}");
    }

    #[test]
    fn propagation_picks_up_local_changes() {
        let mut world = World::new();
        let root = world.spawn((Transform::new(),));
        let child = world.spawn((Transform::from_position(Vec3::X), Parent(root)));
        propagate_transforms(&mut world);
        assert_eq!(global(&world, child).position, Vec3::X);

        world.get::<&mut Transform>(root).unwrap().translate(Vec3::Z);
        propagate_transforms(&mut world);
        assert_eq!(global(&world, child).position, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn stale_global_is_removed_with_transform() {
        let mut world = World::new();
        let root = world.spawn((Transform::from_position(Vec3::X),));
        let other = world.spawn((Transform::new(),));
        propagate_transforms(&mut world);
        assert!(world.get::<&GlobalTransform>(root).is_ok());

        world.remove_one::<Transform>(root).unwrap();
        assert_eq!(propagate_transforms(&mut world), 1);
        assert!(world.get::<&GlobalTransform>(root).is_err());
        assert_eq!(global(&world, other), Transform::new());
    }
}
