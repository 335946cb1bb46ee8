use std::time::Instant;

use glam::Vec3;
use tilephys::*;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f32 {
    lcg(seed) as f32 / u32::MAX as f32
}

fn build_world(n: usize, axis: Axis, seed0: u32) -> PhysWorld {
    let mut world = PhysWorld::new(WorldConfig { sweep_axis: axis });
    let mut seed = seed0;
    for i in 0..n {
        let center = Vec3::new(
            unit(&mut seed) * 400.0 - 200.0,
            unit(&mut seed) * 100.0 - 50.0,
            unit(&mut seed) * 20.0 - 10.0,
        );
        let half = Vec3::splat(0.5 + unit(&mut seed));
        world.add_box(ActorId(i as u64), Aabb::from_center_half_extents(center, half));
    }
    world
}

fn main() {
    env_logger::init();

    let axes = [Axis::X, Axis::Y, Axis::Z];
    let n_vals = [500usize, 2_000, 5_000];
    println!("n,axis,pairwise_ms,sap_ms,pairwise_tests,sap_tests,overlaps");
    for &n in &n_vals {
        for &axis in &axes {
            let mut world = build_world(n, axis, 1);

            let t0 = Instant::now();
            let mut naive = 0usize;
            world.test_pairwise(|_, _| naive += 1);
            let pairwise_ms = t0.elapsed().as_secs_f64() * 1000.0;
            let pairwise_tests = world.stats().pair_tests;

            let t1 = Instant::now();
            let mut pruned = 0usize;
            world.test_sweep_and_prune(|_, _| pruned += 1);
            let sap_ms = t1.elapsed().as_secs_f64() * 1000.0;
            let stats = world.stats();

            assert_eq!(naive, pruned);
            println!(
                "{},{:?},{:.3},{:.3},{},{},{}",
                n, axis, pairwise_ms, sap_ms, pairwise_tests, stats.pair_tests, stats.overlaps
            );
        }
    }
}
