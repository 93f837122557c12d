/**
 * Render pipelines. The viewer only needs one: textured quads with a bind group per mip.
 */
pub mod atlas;
