/// Attribute slot the quad positions are bound to.
pub const POSITION_ATTRIBUTE: u32 = 0;

/// Floats per vertex.
pub const QUAD_COMPONENTS: i32 = 2;

pub const QUAD_VERTEX_COUNT: i32 = 6;

/// Two triangles covering clip space.
pub const QUAD_VERTICES: [f32; 12] = [
    -1.0, 1.0, //
    -1.0, -1.0, //
    1.0, 1.0, //
    1.0, 1.0, //
    -1.0, -1.0, //
    1.0, -1.0, //
];
