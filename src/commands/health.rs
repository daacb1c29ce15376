use super::AppContext;
use crate::api::v1::ConversionApiV1;
use crate::api::ConversionApi;

pub async fn check_health(ctx: &AppContext) -> Result<(), String> {
    let api = ConversionApiV1::new(&ctx.settings.api_base_url, ctx.settings.timeout_secs)
        .map_err(|e| e.to_string())?;
    if api.check_health().await {
        println!("Backend at {} is healthy", api.base_url());
        Ok(())
    } else {
        Err(format!("Backend at {} is not reachable or unhealthy", api.base_url()))
    }
}
