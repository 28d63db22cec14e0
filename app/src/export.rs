//! Wavefront OBJ/MTL export.
//!
//! Meshes accumulate into one OBJ document with a sibling MTL file.
//! Materials are deduplicated through a [`MaterialKey`]-keyed cache: meshes
//! whose resolved texture lists are equal share one `usemtl` entry.

use std::collections::HashMap;

use ripcap_core::capture::{MaterialKey, Primitives, ReconstructedGeometry};

/// Accumulates reconstructed meshes into OBJ/MTL text.
pub struct ObjExporter {
    obj: String,
    mtl: String,
    materials: HashMap<MaterialKey, usize>,
    position_base: u32,
    uv_base: u32,
    normal_base: u32,
}

impl ObjExporter {
    /// `mtl_name` is the MTL file name referenced by the OBJ's `mtllib`.
    pub fn new(mtl_name: &str) -> Self {
        Self {
            obj: format!("mtllib {mtl_name}\n"),
            mtl: String::new(),
            materials: HashMap::new(),
            position_base: 0,
            uv_base: 0,
            normal_base: 0,
        }
    }

    /// Number of distinct materials written so far.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Look up or create the material for a texture list. Meshes without
    /// textures carry no material at all.
    fn material_for(&mut self, key: MaterialKey) -> Option<usize> {
        if key.is_empty() {
            return None;
        }
        if let Some(&id) = self.materials.get(&key) {
            return Some(id);
        }
        let id = self.materials.len();
        self.mtl.push_str(&format!("newmtl mat_{id}\n"));
        self.mtl.push_str("Kd 0.8 0.8 0.8\n");
        if let Some(first) = key.paths().first() {
            self.mtl
                .push_str(&format!("map_Kd {}\n", first.display()));
        }
        self.mtl.push('\n');
        self.materials.insert(key, id);
        Some(id)
    }

    /// Append one mesh. `group` is the capture's (group0, group1) pair.
    pub fn add_mesh(&mut self, name: &str, group: (u32, u32), geometry: &ReconstructedGeometry) {
        self.obj.push_str(&format!("o {name}\n"));
        self.obj
            .push_str(&format!("g grp_{}_{}\n", group.0, group.1));

        for p in &geometry.positions {
            self.obj
                .push_str(&format!("v {} {} {}\n", p[0], p[1], p[2]));
        }

        // First UV set only; OBJ has a single texture-coordinate channel.
        // V flips because captures use a top-left origin.
        let uvs = geometry.uv_sets.first();
        if let Some(uvs) = uvs {
            for uv in uvs {
                self.obj
                    .push_str(&format!("vt {} {}\n", uv[0], 1.0 - uv[1]));
            }
        }

        if let Some(normals) = &geometry.normals {
            for n in normals {
                self.obj
                    .push_str(&format!("vn {} {} {}\n", n[0], n[1], n[2]));
            }
        }

        if let Some(id) = self.material_for(MaterialKey::new(&geometry.textures)) {
            self.obj.push_str(&format!("usemtl mat_{id}\n"));
        }

        let has_uvs = uvs.is_some();
        let has_normals = geometry.normals.is_some();
        match &geometry.primitives {
            Primitives::Triangles(triangles) => {
                for tri in triangles {
                    self.obj.push('f');
                    for &index in tri {
                        self.obj
                            .push_str(&self.face_vertex(index, has_uvs, has_normals));
                    }
                    self.obj.push('\n');
                }
            }
            Primitives::Lines(lines) => {
                for line in lines {
                    self.obj.push_str(&format!(
                        "l {} {}\n",
                        self.position_base + line[0] + 1,
                        self.position_base + line[1] + 1
                    ));
                }
            }
            Primitives::Points => {
                for i in 0..geometry.vertex_count() as u32 {
                    self.obj
                        .push_str(&format!("p {}\n", self.position_base + i + 1));
                }
            }
        }

        self.position_base += geometry.vertex_count() as u32;
        if let Some(uvs) = uvs {
            self.uv_base += uvs.len() as u32;
        }
        if let Some(normals) = &geometry.normals {
            self.normal_base += normals.len() as u32;
        }
    }

    /// One `v/vt/vn` face element (1-based, offset by the running bases).
    fn face_vertex(&self, index: u32, has_uvs: bool, has_normals: bool) -> String {
        let v = self.position_base + index + 1;
        match (has_uvs, has_normals) {
            (false, false) => format!(" {v}"),
            (true, false) => format!(" {v}/{}", self.uv_base + index + 1),
            (false, true) => format!(" {v}//{}", self.normal_base + index + 1),
            (true, true) => format!(
                " {v}/{}/{}",
                self.uv_base + index + 1,
                self.normal_base + index + 1
            ),
        }
    }

    /// Finish and return (OBJ text, MTL text).
    pub fn finish(self) -> (String, String) {
        (self.obj, self.mtl)
    }
}
