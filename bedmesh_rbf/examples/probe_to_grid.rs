use bedmesh_rbf::{generate_random_points, BedSurfaces, GridSpec, RbfInterpolator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Simulate probing a 200 x 200 bed at 60 scattered locations
    let extents = [0.0, 200.0, 0.0, 200.0];
    let points = generate_random_points(60, extents, Some(42));

    // Assign heights from a synthetic bowl-shaped bed deviation
    let point_values = BedSurfaces::bowl_2d(&points, extents, 0.25);

    // Fit the RBF surface through the probed points
    let surface = RbfInterpolator::builder(points, point_values).build()?;

    // Sample the surface on a regular 21 x 21 heightmap grid
    let grid = GridSpec::new(0.0, 200.0, 0.0, 200.0, 21, 21)?;
    let heights = surface.evaluate_grid(&grid);

    // Report the residual at the probed locations
    let fitted = surface.evaluate_at_source();
    let max_residual = surface
        .point_values
        .col(0)
        .iter()
        .zip(fitted.col(0).iter())
        .fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs()));

    println!(
        "sampled {} grid nodes, max residual at probes: {:.3e}",
        heights.spec().num_nodes(),
        max_residual
    );

    Ok(())
}
