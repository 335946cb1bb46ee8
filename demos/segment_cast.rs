use glam::{Quat, Vec3};
use tilephys::*;

fn main() {
    env_logger::init();

    let mut world = PhysWorld::new(WorldConfig::default());
    let unit = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));

    let near = world.add_box(ActorId(10), unit);
    let far = world.add_box(ActorId(20), unit);
    world.on_update_world_transform(near, &Transform::from_position(Vec3::new(2.0, 0.0, 0.0)));
    world.on_update_world_transform(
        far,
        &Transform {
            position: Vec3::new(5.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_4),
            scale: 2.0,
        },
    );

    for (id, b) in world.iter() {
        println!("box {:?} actor={:?} world={:?}", id, b.owner(), b.world_box());
    }

    let ray = LineSegment::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
    match world.segment_cast(&ray) {
        Some(hit) => println!(
            "Segment hit actor={:?} t={:.3} point=({:.2},{:.2},{:.2}) n=({:.0},{:.0},{:.0})",
            hit.actor, hit.t, hit.point.x, hit.point.y, hit.point.z, hit.normal.x, hit.normal.y, hit.normal.z
        ),
        None => println!("No hit"),
    }

    world.remove_box(near);
    if let Some(hit) = world.segment_cast(&ray) {
        println!("After removal: actor={:?} t={:.3}", hit.actor, hit.t);
    }
}
