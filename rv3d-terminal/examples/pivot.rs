/// Example: re-anchor a mesh and spin it about the new pivot
///
/// Usage: cargo run --example pivot -- path/to/file.stl
///
/// The lowest bounding-box corner becomes the pivot: the object is
/// shifted so that corner lands on the world origin, wrapped in a fresh
/// group anchored there, and the wrapper spins about it.

use nalgebra::Point3;
use rv3d_core::geometry::cube_triangles;
use rv3d_core::{
    import_mesh, relocate_origin, Canvas, GroupMembers, GroupSpec, MeshDescriptor, Scene,
};
use rv3d_terminal::TerminalApp;
use std::env;
use std::io;

fn main() -> io::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut scene = Scene::new();
    let object = match env::args().nth(1) {
        Some(path) => {
            println!("Loading STL file: {}", path);
            import_mesh(&MeshDescriptor::from_path(&path), &mut scene).map_err(to_io_error)?
        }
        None => {
            eprintln!("No STL file provided, using default cube...");
            let members: Vec<_> = cube_triangles(2.0)
                .into_iter()
                .map(|triangle| scene.create_triangle(triangle))
                .collect();
            scene
                .create_group(GroupMembers::Triangles(members), GroupSpec::default())
                .map_err(to_io_error)?
        }
    };

    let bounds = scene.world_bounds();
    let pivot = if bounds.is_empty() {
        Point3::origin()
    } else {
        bounds.min
    };
    println!(
        "Pivoting about ({:.2}, {:.2}, {:.2})",
        pivot.x, pivot.y, pivot.z
    );

    let wrapper =
        relocate_origin(object, pivot, Point3::origin(), &mut scene).map_err(to_io_error)?;

    println!("Starting terminal preview (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(scene, wrapper)?;
    app.run()
}

fn to_io_error(error: rv3d_core::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error.to_string())
}
