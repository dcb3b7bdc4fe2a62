// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Spreadsheet import and export against the in-memory store.

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header}
};
use elabel::{
    api::{self, AppState},
    config::Settings,
    schema::{IngredientCategory, IngredientData, ProductData, SugarContent, WineType},
    store::{IngredientRepository, MemoryStore, ProductRepository},
    transfer::{self, ImportReport, TransferError}
};
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use tower::ServiceExt;

fn full_product() -> ProductData {
    ProductData {
        name: "Château Test".into(),
        brand: Some("Maison".into()),
        net_volume: Some("750 ml".into()),
        vintage: Some("2018".into()),
        wine_type: Some(WineType::Rose),
        sugar_content: Some(SugarContent::SemiDry),
        appellation: Some("Côtes de Provence".into()),
        alcohol_content: Some("12.5% vol".into()),
        ingredients_text: Some("Grapes, sulphites".into()),
        packaging_gases: Some("Argon".into()),
        portion_size: Some("100".into()),
        unit: Some("ml".into()),
        kcal: Some("70".into()),
        kj: Some("290".into()),
        fat: Some("0".into()),
        carbohydrates: Some("2.6".into()),
        organic: true,
        vegetarian: true,
        vegan: false,
        operator_type: Some("Bottler".into()),
        operator_name: Some("Maison SA".into()),
        operator_address: Some("1 Rue du Vin, Bordeaux".into()),
        additional_info: Some("Contains sulphites".into()),
        country_of_origin: Some("France".into()),
        sku: Some("CT-2018".into()),
        ean: Some("3760123450012".into()),
        barcode_link: Some("https://example.com/b/ct".into()),
        external_link: Some("https://example.com/ct".into()),
        redirect_link: Some("https://go.example/ct".into()),
        image: Some("https://cdn.example.com/ct.png".into())
    }
}

fn workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
    }
    book.save_to_buffer().unwrap()
}

#[tokio::test]
async fn products_survive_export_and_import() {
    let source = MemoryStore::new();
    source.create_product(full_product()).await.unwrap();
    source
        .create_product(ProductData {
            name: "Plain".into(),
            ..ProductData::default()
        })
        .await
        .unwrap();
    let exported = transfer::export_products(&source.list_products().await.unwrap()).unwrap();

    let target = MemoryStore::new();
    let report = transfer::import_products(&target, &exported).await.unwrap();
    assert_eq!(report.imported, 2, "{report:?}");
    assert_eq!(report.failed, 0);

    let before: Vec<ProductData> = source.list_products().await.unwrap().into_iter().map(|p| p.data).collect();
    let after: Vec<ProductData> = target.list_products().await.unwrap().into_iter().map(|p| p.data).collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn oversized_text_survives_export_and_import() {
    let image = format!("data:image/png;base64,{}", "A".repeat(40_000));
    let notes = "Enjoy responsibly. ".repeat(4_000);
    let source = MemoryStore::new();
    source
        .create_product(ProductData {
            name: "Inline image".into(),
            image: Some(image.clone()),
            additional_info: Some(notes.trim().to_owned()),
            ..ProductData::default()
        })
        .await
        .unwrap();
    source
        .create_product(ProductData {
            name: "Short".into(),
            image: Some("https://cdn.example.com/s.png".into()),
            ..ProductData::default()
        })
        .await
        .unwrap();
    let exported = transfer::export_products(&source.list_products().await.unwrap()).unwrap();

    let target = MemoryStore::new();
    let report = transfer::import_products(&target, &exported).await.unwrap();
    assert_eq!(report.imported, 2, "{report:?}");
    assert_eq!(report.failed, 0);

    let stored = target.list_products().await.unwrap();
    assert_eq!(stored[0].data.image.as_deref(), Some(image.as_str()));
    assert_eq!(stored[0].data.additional_info.as_deref(), Some(notes.trim()));
    assert_eq!(stored[1].data.image.as_deref(), Some("https://cdn.example.com/s.png"));
}

#[tokio::test]
async fn numeric_name_cell_imports_as_text() {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Vintage").unwrap();
    sheet.write_number(1, 0, 1945).unwrap();
    sheet.write_number(1, 1, 1945).unwrap();
    let bytes = book.save_to_buffer().unwrap();

    let store = MemoryStore::new();
    let report = transfer::import_products(&store, &bytes).await.unwrap();
    assert_eq!(report.imported, 1, "{report:?}");
    let product = &store.list_products().await.unwrap()[0];
    assert_eq!(product.data.name, "1945");
    assert_eq!(product.data.vintage.as_deref(), Some("1945"));
}

#[tokio::test]
async fn ingredients_survive_export_and_import() {
    let source = MemoryStore::new();
    source
        .create_ingredient(IngredientData {
            name: "Sulphur dioxide".into(),
            category: IngredientCategory::Preservative,
            e_number: Some("E220".into()),
            other_ingredient_detail: None,
            allergens: vec!["sulphites".into(), "sulfites".into()]
        })
        .await
        .unwrap();
    source
        .create_ingredient(IngredientData {
            name: "Isinglass".into(),
            category: IngredientCategory::FiningAgent,
            e_number: None,
            other_ingredient_detail: Some("fish derived".into()),
            allergens: vec!["fish".into()]
        })
        .await
        .unwrap();
    let exported = transfer::export_ingredients(&source.list_ingredients().await.unwrap()).unwrap();

    let target = MemoryStore::new();
    let report = transfer::import_ingredients(&target, &exported).await.unwrap();
    assert_eq!(report.imported, 2, "{report:?}");

    let before: Vec<IngredientData> = source.list_ingredients().await.unwrap().into_iter().map(|i| i.data).collect();
    let after: Vec<IngredientData> = target.list_ingredients().await.unwrap().into_iter().map(|i| i.data).collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn bad_rows_do_not_stop_the_import() {
    let bytes = workbook(&[
        &["Name", "Wine Type", "Vegan"],
        &["A", "Red", "yes"],
        &["", "White", ""],
        &["C", "Purple", ""],
        &[],
        &["D", "Rosé", "no"]
    ]);
    let store = MemoryStore::new();
    let report = transfer::import_products(&store, &bytes).await.unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.failed, 2);
    let rows: Vec<usize> = report.failures.iter().map(|f| f.row).collect();
    assert_eq!(rows, [3, 4]);
    assert!(report.failures[0].error.contains("name"));
    assert!(report.failures[1].error.contains("wineType"));

    let names: Vec<String> = store.list_products().await.unwrap().into_iter().map(|p| p.data.name).collect();
    assert_eq!(names, ["A", "D"]);
    let stored = store.list_products().await.unwrap();
    assert!(stored[0].data.vegan);
    assert_eq!(stored[1].data.wine_type, Some(WineType::Rose));
}

#[tokio::test]
async fn headers_are_matched_loosely() {
    let bytes = workbook(&[
        &["name", "type", "ABV", "country"],
        &["Loose", "White", "11%", "Italy"]
    ]);
    let store = MemoryStore::new();
    let report = transfer::import_products(&store, &bytes).await.unwrap();
    assert_eq!(report.imported, 1, "{report:?}");

    let product = &store.list_products().await.unwrap()[0];
    assert_eq!(product.data.wine_type, Some(WineType::White));
    assert_eq!(product.data.alcohol_content.as_deref(), Some("11%"));
    assert_eq!(product.data.country_of_origin.as_deref(), Some("Italy"));
}

#[tokio::test]
async fn ingredient_category_falls_back_to_other() {
    let bytes = workbook(&[
        &["Name", "Category", "Allergens"],
        &["Mystery", "", "egg, milk, egg"],
        &["Odd", "Spice", ""],
        &["Citric acid", "Acidifier", ""]
    ]);
    let store = MemoryStore::new();
    let report = transfer::import_ingredients(&store, &bytes).await.unwrap();
    assert_eq!(report.imported, 3, "{report:?}");

    let stored = store.list_ingredients().await.unwrap();
    assert_eq!(stored[0].data.category, IngredientCategory::Other);
    assert_eq!(stored[0].data.allergens, ["egg", "milk"]);
    assert_eq!(stored[1].data.category, IngredientCategory::Other);
    assert_eq!(stored[2].data.category, IngredientCategory::Acidifier);
}

#[tokio::test]
async fn empty_sheet_imports_nothing() {
    let bytes = workbook(&[&["Name", "Brand"]]);
    let report = transfer::import_products(&MemoryStore::new(), &bytes).await.unwrap();
    assert_eq!(report, ImportReport::default());
}

#[tokio::test]
async fn garbage_is_a_read_error() {
    let result = transfer::import_products(&MemoryStore::new(), b"definitely not a workbook").await;
    assert!(matches!(result, Err(TransferError::Read(_))));
}

#[tokio::test]
async fn import_endpoint_reports_rows() {
    let app = api::router(AppState::new(MemoryStore::new(), Settings::local().unwrap()));
    let bytes = workbook(&[&["Name"], &["One"], &["Two"]]);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products/import")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(bytes))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(report["imported"], 2);
    assert_eq!(report["failed"], 0);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/products/export")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("products.xlsx")
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn import_endpoint_rejects_unreadable_upload() {
    let app = api::router(AppState::new(MemoryStore::new(), Settings::local().unwrap()));
    for payload in [Vec::new(), b"nope".to_vec()] {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/ingredients/import")
            .body(Body::from(payload))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
