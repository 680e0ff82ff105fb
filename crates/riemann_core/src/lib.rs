pub mod colormap;
pub mod grid;
pub mod scene;
pub mod surface;
/// The `riemann_core` crate computes the geometry of the Riemann surface of `sqrt(z)`.
/// It performs no I/O: callers receive plain matrices and a renderer-neutral `Scene`.
///
/// Key components:
/// - **Traits**: `Scalar` (floating-point abstraction used for axis sampling).
/// - **Grid**: linear axis sampling, the polar mesh grid and stride decimation.
/// - **Surface**: the two branches `±sqrt(r) e^{iθ/2}` evaluated on the mesh.
/// - **Colormap**: the cyclic hue wheel keyed on angle, offset by half a cycle per sheet.
/// - **Scene**: filled facets and wireframes ready for any 3D plotting backend.
pub mod traits;
