use krbcache::{Context, Result};
use log::info;

pub fn destroy(mut context: Context) -> Result<()> {
    let cache_name = context.cache_name();
    context.destroy()?;

    if let Some(cache_name) = cache_name {
        info!("Destroyed {}", cache_name);
    }
    return Ok(());
}
