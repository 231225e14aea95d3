//! Deterministic id derivation for declarations without an explicit `@id`.

use crate::ast::decl::{DeclId, DeclKind, Schema, MIN_UID};
use crate::error::{Error, Result};
use md5::{Digest, Md5};

/// Derives the id for a declaration named `name` inside a scope whose own id
/// is `scope_id`: MD5 over the scope id's little-endian bytes followed by the
/// name's UTF-8 bytes, first 8 digest bytes read little-endian, top bit
/// forced on so derived ids never collide with the hand-written range below
/// [`MIN_UID`].
pub fn derive_id(scope_id: u64, name: &str) -> u64 {
    let mut hasher = Md5::new();
    hasher.update(scope_id.to_le_bytes());
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes) | MIN_UID
}

/// Fills in missing ids for every id-bearing declaration of `module`.
///
/// Arena order puts parents before children, so an enclosing scope's id
/// (explicit or just derived) is always available; the module's own id is
/// mandatory in source.
pub fn generate_ids(schema: &mut Schema, module: DeclId) -> Result<()> {
    for id in schema.module_decls(module) {
        let decl = schema.decl(id);
        let bears_id = matches!(
            decl.kind,
            DeclKind::Struct(_) | DeclKind::Interface(_) | DeclKind::Enum(_) | DeclKind::Annotation(_)
        );
        if !bears_id || decl.id.is_some() {
            continue;
        }
        let scope = decl.scope.ok_or_else(|| {
            Error::internal(format!("declaration '{}' has no enclosing scope", decl.name))
        })?;
        let scope_id = schema.decl(scope).id.ok_or_else(|| {
            Error::resolve(format!(
                "cannot derive an id for '{}': its enclosing scope has none",
                decl.name
            ))
        })?;
        let derived = derive_id(scope_id, &decl.name);
        tracing::trace!(name = %schema.decl(id).name, id = derived, "derived declaration id");
        schema.decl_mut(id).id = Some(derived);
    }
    Ok(())
}
