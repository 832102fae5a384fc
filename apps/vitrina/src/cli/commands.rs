//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState, EMPTY_CATALOG_NOTICE, missing_fields_notice};
use crate::config::{AppConfig, SourceConfig};
use crate::fetch::StoreSource;
use std::path::{Path, PathBuf};
use vitrina_core::{
    CustomerInfo, LoadOutcome, StorefrontSession, VitrinaError, build_link, format_line_item,
    format_money,
};

/// Validate output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, VitrinaError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        VitrinaError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(VitrinaError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| VitrinaError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &AppConfig, host: &str, port: u16) -> Result<(), VitrinaError> {
    let state = AppState::from_config(config);

    println!("Vitrina Storefront Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:    {}", host);
    println!("  Port:    {}", port);
    println!("  Source:  {}", config.source);
    println!(
        "  Phone:   {}",
        config
            .phone_number
            .as_ref()
            .map_or("(not configured)", |p| p.as_str())
    );
    println!();
    println!("Endpoints:");
    println!("  POST /sessions              - Open a session");
    println!("  GET  /sessions/{{id}}/catalog - List products");
    println!("  PUT  /sessions/{{id}}/cart    - Set a quantity");
    println!("  POST /sessions/{{id}}/order   - Compose the order");
    println!("  POST /sessions/{{id}}/reload  - Reload the catalog");
    println!("  GET  /health                - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// List the products in the catalog.
pub async fn cmd_catalog(config: &AppConfig, json_mode: bool) -> Result<(), VitrinaError> {
    let source = StoreSource::new(config);
    let outcome = source.load().await;
    let rejected = outcome.rejected();
    let catalog = outcome.into_catalog();

    if json_mode {
        let products: Vec<serde_json::Value> = catalog
            .iter()
            .enumerate()
            .map(|(index, p)| {
                serde_json::json!({
                    "index": index,
                    "name": p.name,
                    "price": format_money(p.price),
                    "stock": p.stock,
                    "code": p.code,
                    "image": p.image,
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "source": config.source.to_string(),
            "products": products,
            "rejected_rows": rejected,
            "notice": catalog.is_empty().then_some(EMPTY_CATALOG_NOTICE),
        }));
        return Ok(());
    }

    println!("Vitrina Catalog");
    println!("===============");
    println!("Source: {}", config.source);
    println!();

    if catalog.is_empty() {
        println!("{}", EMPTY_CATALOG_NOTICE);
        return Ok(());
    }

    for (index, product) in catalog.iter().enumerate() {
        let code = if product.code.is_empty() {
            String::new()
        } else {
            format!(" [{}]", product.code)
        };
        println!(
            "  {:>3}. {}{}  ${}  (stock: {})",
            index,
            product.name,
            code,
            format_money(product.price),
            product.stock
        );
    }
    println!();
    println!("Products: {}", catalog.len());
    if rejected > 0 {
        println!("Rejected rows: {}", rejected);
    }

    Ok(())
}

// =============================================================================
// ORDER COMMAND
// =============================================================================

/// Compose an order message from a selection and customer fields.
///
/// Selections are validated against stock in order. Missing required
/// fields print the list of labels and fail.
pub async fn cmd_order(
    config: &AppConfig,
    json_mode: bool,
    selection: &[(usize, u32)],
    fields: &[(String, String)],
) -> Result<(), VitrinaError> {
    let composer = config.composer();
    let source = StoreSource::new(config);

    let outcome = source.load().await;
    if let LoadOutcome::SourceUnavailable(e) = &outcome {
        return Err(e.clone());
    }

    let mut session = StorefrontSession::new();
    session.install(outcome);
    for &(index, quantity) in selection {
        session.select(index, quantity)?;
    }

    let customer: CustomerInfo = fields.iter().cloned().collect();
    let summary = session.order_summary(&composer)?;
    if summary.is_empty() {
        return Err(VitrinaError::EmptyOrder);
    }

    let missing: Vec<String> = composer
        .form()
        .missing(&customer)
        .into_iter()
        .map(|f| f.label.clone())
        .collect();
    if !missing.is_empty() {
        let notice = missing_fields_notice(&missing);
        if json_mode {
            print_json(&serde_json::json!({
                "submittable": false,
                "missing_fields": missing,
                "notice": notice,
            }));
        } else {
            println!("{}", notice);
        }
        return Err(VitrinaError::MissingRequiredField(missing.join(", ")));
    }

    let message = composer.format_message(&summary, &customer)?;
    let link = config
        .phone_number
        .as_ref()
        .map(|phone| build_link(phone, &message));

    if json_mode {
        let items: Vec<serde_json::Value> = summary
            .line_items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "index": item.index,
                    "quantity": item.quantity,
                    "name": item.name,
                    "code": item.code,
                    "unit_price": format_money(item.unit_price),
                    "subtotal": format_money(item.subtotal),
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "submittable": true,
            "line_items": items,
            "total": format_money(summary.total),
            "message": message.as_str(),
            "link": link,
        }));
        return Ok(());
    }

    println!("Order");
    println!("=====");
    for item in &summary.line_items {
        println!("  {}", format_line_item(item));
    }
    println!();
    println!("Total: ${}", format_money(summary.total));
    println!();
    println!("Message:");
    println!("{}", message);
    println!();
    match link {
        Some(link) => println!("Link: {}", link),
        None => println!("Link: (no phone number configured)"),
    }

    Ok(())
}

// =============================================================================
// FETCH COMMAND
// =============================================================================

/// Download the configured remote spreadsheet to a file.
pub async fn cmd_fetch(
    config: &AppConfig,
    json_mode: bool,
    output: &Path,
) -> Result<(), VitrinaError> {
    let SourceConfig::RemoteUrl(url) = &config.source else {
        return Err(VitrinaError::InvalidConfig(
            "fetch needs a remote_url source".to_string(),
        ));
    };

    let validated_output = validate_output_path(output)?;
    let source = StoreSource::new(config);
    let bytes = source.download(url).await?;

    std::fs::write(&validated_output, &bytes)
        .map_err(|e| VitrinaError::IoError(format!("Write failed: {}", e)))?;

    tracing::info!(bytes = bytes.len(), "Spreadsheet downloaded");

    if json_mode {
        print_json(&serde_json::json!({
            "success": true,
            "output": validated_output.to_string_lossy(),
            "bytes": bytes.len(),
        }));
    } else {
        println!(
            "Downloaded {} bytes to {}",
            bytes.len(),
            validated_output.display()
        );
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_for(csv: &str) -> (tempfile::NamedTempFile, AppConfig) {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        file.write_all(csv.as_bytes()).expect("write");
        let config = AppConfig {
            source: SourceConfig::Path(file.path().to_path_buf()),
            ..AppConfig::default()
        };
        (file, config)
    }

    const CSV: &str = "COD_ALFA,DETALLE,PRECIO,STOCK\nA-1,Mesa,10.5,3\nB-2,Silla,4,0\n";

    fn full_customer() -> Vec<(String, String)> {
        [
            ("razon_social", "ACME"),
            ("cuit", "20-1"),
            ("nombre", "Ana"),
            ("email", "ana@x.com"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[tokio::test]
    async fn catalog_command_lists_products() {
        let (_file, config) = config_for(CSV);
        assert!(cmd_catalog(&config, true).await.is_ok());
        assert!(cmd_catalog(&config, false).await.is_ok());
    }

    #[tokio::test]
    async fn order_command_succeeds_with_complete_form() {
        let (_file, config) = config_for(CSV);
        let result = cmd_order(&config, true, &[(0, 2)], &full_customer()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn order_command_rejects_missing_fields() {
        let (_file, config) = config_for(CSV);
        let result = cmd_order(&config, false, &[(0, 1)], &[]).await;
        assert!(matches!(result, Err(VitrinaError::MissingRequiredField(_))));
    }

    #[tokio::test]
    async fn order_command_rejects_quantity_over_stock() {
        let (_file, config) = config_for(CSV);
        let result = cmd_order(&config, false, &[(1, 1)], &full_customer()).await;
        assert!(matches!(
            result,
            Err(VitrinaError::QuantityExceedsStock { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn order_command_rejects_empty_selection() {
        let (_file, config) = config_for(CSV);
        let result = cmd_order(&config, false, &[], &full_customer()).await;
        assert_eq!(result, Err(VitrinaError::EmptyOrder));
    }

    #[tokio::test]
    async fn fetch_requires_remote_source() {
        let config = AppConfig::default();
        let result = cmd_fetch(&config, false, Path::new("out.xlsx")).await;
        assert!(matches!(result, Err(VitrinaError::InvalidConfig(_))));
    }

    #[test]
    fn output_path_needs_existing_parent() {
        assert!(validate_output_path(Path::new("/no/such/dir/out.xlsx")).is_err());
        assert!(validate_output_path(Path::new("out.xlsx")).is_ok());
    }
}
