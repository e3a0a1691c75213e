/// RV3D Terminal Preview - STL meshes as spinning ASCII
///
/// Imports the STL file given on the command line (or a built-in cube)
/// and spins it in the terminal.
/// Controls:
///   - WASD / Arrow Keys: Spin the object
///   - Space: Pause/resume the auto spin
///   - R: Reset the spin
///   - Q/ESC: Quit

use rv3d_core::geometry::cube_triangles;
use rv3d_core::{import_mesh, Canvas, GroupMembers, GroupSpec, MeshDescriptor, Scene};
use rv3d_terminal::TerminalApp;
use std::env;
use std::io;

fn main() -> io::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut scene = Scene::new();
    let subject = match env::args().nth(1) {
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

    log::info!("scene ready with {} triangles", scene.triangle_count());
    println!("Starting terminal preview (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(scene, subject)?;
    app.run()?;

    println!("Thank you for using RV3D Terminal Preview!");
    Ok(())
}

fn to_io_error(error: rv3d_core::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error.to_string())
}
