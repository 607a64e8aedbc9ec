use krbcache::{Context, Result, LEGACY_CACHE_NAME};

pub fn import(context: &mut Context, source: Option<String>) -> Result<()> {
    let imported = match &source {
        Some(source) => context.import_cache(source)?,
        None => context.import_legacy_cache()?,
    };

    let source = source.as_deref().unwrap_or(LEGACY_CACHE_NAME);
    if imported {
        println!("Imported the tickets of {}", source);
    } else {
        println!("No initial ticket in {}, nothing imported", source);
    }
    return Ok(());
}
