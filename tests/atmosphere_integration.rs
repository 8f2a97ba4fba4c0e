use approx::assert_relative_eq;
use glam::DVec2;
use planetsim::atmosphere::{
    evaluate_forces, initialize_column, layer_geometry, transport_mass, GridSize, PhysicalConstants,
    RunState, WindGrid, Windcell, Windsim, WindsimConfig,
};
use planetsim::terrain::PlanetConstants;

const RADIUS: f64 = 6_371_000.0;
const GRAVITY: f64 = 9.81;
const HEIGHT: f64 = 100_000.0;

fn planet() -> PlanetConstants {
    PlanetConstants {
        radius: RADIUS,
        gravity: GRAVITY,
        ..PlanetConstants::earth_like()
    }
}

fn config(x: usize, y: usize, z: usize, iterations: usize) -> WindsimConfig {
    WindsimConfig {
        size: GridSize::new(x, y, z),
        height: HEIGHT,
        iterations,
        snapshot_interval: 0,
        progress_interval: 0,
        parallel: false,
        ..WindsimConfig::default()
    }
}

fn constants() -> PhysicalConstants {
    PhysicalConstants {
        radius: RADIUS,
        gravity: GRAVITY,
        gas_constant: 287.0,
    }
}

fn assert_all_finite(label: &str, grid: &WindGrid) {
    let size = grid.size();
    for (i, cell) in grid.cells().iter().enumerate() {
        if !cell.is_finite() {
            let z = i % size.z;
            let column = i / size.z;
            panic!(
                "{}: NaN/Inf at cell ({}, {}, {}): mass={}, velocity={}, force_up={}, force_down={}",
                label,
                column % size.x,
                column / size.x,
                z,
                cell.mass,
                cell.velocity.z,
                cell.force_up,
                cell.force_down
            );
        }
    }
}

#[test]
fn single_column_scenario() {
    let mut sim = Windsim::new(config(1, 1, 4, 10), &planet(), DVec2::splat(1000.0)).unwrap();
    assert_eq!(sim.state(), RunState::Initialized);

    let layers = sim.layers();
    assert!(layers[0].altitude < layers[3].altitude);
    assert!(layers[0].dimension.x < layers[3].dimension.x);
    assert!(layers[0].dimension.y < layers[3].dimension.y);
    let depth: f64 = layers.iter().map(|l| l.dimension.z).sum();
    assert_relative_eq!(depth, HEIGHT, max_relative = 1e-12);

    let mut column = sim.grid().column(0, 0).unwrap().to_vec();
    evaluate_forces(&mut column, &constants());
    for (z, cell) in column.iter().enumerate() {
        assert!(
            cell.force_down > cell.force_up,
            "layer {}: down {} <= up {}",
            z,
            cell.force_down,
            cell.force_up
        );
    }

    let before = sim.grid().total_mass();
    assert_eq!(sim.step(), Some(0));
    let after = sim.grid().total_mass();
    assert_relative_eq!(after, before, max_relative = 1e-12);
    assert_eq!(sim.state(), RunState::Running { iteration: 0 });
    assert_all_finite("after one iteration", sim.grid());
}

#[test]
fn columns_evolve_independently() {
    const LAYERS: usize = 8;
    const ITERATIONS: usize = 50;

    let mut wide = Windsim::new(config(2, 2, LAYERS, ITERATIONS), &planet(), DVec2::splat(2000.0)).unwrap();
    let mut single = Windsim::new(config(1, 1, LAYERS, ITERATIONS), &planet(), DVec2::splat(1000.0)).unwrap();

    while wide.step().is_some() {}
    while single.step().is_some() {}
    assert_eq!(wide.state(), RunState::Done);

    let reference = single.grid().column(0, 0).unwrap();
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(wide.grid().column(x, y).unwrap(), reference, "column ({}, {})", x, y);
        }
    }
    assert_all_finite("wide grid", wide.grid());
}

#[test]
fn parallel_run_matches_sequential_run() {
    let mut parallel = config(3, 2, 6, 40);
    parallel.parallel = true;
    let sequential = config(3, 2, 6, 40);
    let map = DVec2::new(3000.0, 2000.0);

    let mut a = Windsim::new(parallel, &planet(), map).unwrap();
    let mut b = Windsim::new(sequential, &planet(), map).unwrap();
    let sa = a.run(&mut planetsim::atmosphere::NullObserver).unwrap();
    let sb = b.run(&mut planetsim::atmosphere::NullObserver).unwrap();

    assert_eq!(a.grid().cells(), b.grid().cells());
    assert_eq!(sa.final_mass, sb.final_mass);
    assert_eq!(sa.peak_vertical_speed, sb.peak_vertical_speed);
}

#[test]
fn uniform_column_settles() {
    let mut sim = Windsim::new(config(1, 1, 16, 5000), &planet(), DVec2::splat(1000.0)).unwrap();
    let initial_mass = sim.grid().total_mass();

    sim.step();
    let first = sim.grid().peak_vertical_speed();
    assert!(first > 0.0);

    while sim.step().is_some() {}
    let last = sim.grid().peak_vertical_speed();

    assert!(last < first / 10.0, "velocities did not decay: {} -> {}", first, last);
    assert_relative_eq!(sim.grid().total_mass(), initial_mass, max_relative = 1e-9);
    assert!(sim.grid().cells().iter().all(|c| c.mass >= 0.0));
    assert_all_finite("settled column", sim.grid());
}

fn seeded_column(layers: usize) -> Vec<Windcell> {
    let geometry = layer_geometry(RADIUS, HEIGHT, layers, DVec2::splat(1000.0));
    let mut column = vec![Windcell::default(); layers];
    initialize_column(&mut column, &geometry, &config(1, 1, layers, 1));
    column
}

#[test]
fn floor_keeps_its_mass_when_pushed_down() {
    let mut column = seeded_column(4);
    let floor_mass = column[0].mass;
    column[0].velocity.z = 50.0;

    transport_mass(&mut column);
    assert_eq!(column[0].mass, floor_mass);
}

#[test]
fn ceiling_keeps_its_mass_when_pushed_up() {
    let mut column = seeded_column(4);
    let total: f64 = column.iter().map(|c| c.mass).sum();
    let ceiling_mass = column[3].mass;
    column[3].velocity.z = -50.0;

    transport_mass(&mut column);
    assert_eq!(column[3].mass, ceiling_mass);
    assert_relative_eq!(column.iter().map(|c| c.mass).sum::<f64>(), total, max_relative = 1e-12);
}

#[test]
fn invalid_configurations_are_rejected_before_allocation() {
    let map = DVec2::splat(1000.0);

    let err = Windsim::new(config(0, 1, 4, 1), &planet(), map).err().unwrap();
    assert!(err.to_string().contains("0"), "{}", err);

    let mut bad_height = config(1, 1, 4, 1);
    bad_height.height = 0.0;
    let err = Windsim::new(bad_height, &planet(), map).err().unwrap();
    assert!(err.to_string().contains("height"), "{}", err);

    let no_gravity = PlanetConstants { gravity: 0.0, ..planet() };
    let err = Windsim::new(config(1, 1, 4, 1), &no_gravity, map).err().unwrap();
    assert!(err.to_string().contains("gravity"), "{}", err);
}
