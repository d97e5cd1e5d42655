// src/services/sales_service.rs

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, SaleRepository, StockMovementRepository},
    models::{
        inventory::MovementType,
        sales::{SaleItem, SaleWithItems},
    },
};

/// Item de uma venda do PDV, já validado pelo handler.
#[derive(Debug, Clone)]
pub struct PosSaleItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Clone)]
pub struct SalesService {
    pool: PgPool,
    products: ProductRepository,
    sales: SaleRepository,
    movements: StockMovementRepository,
}

impl SalesService {
    pub fn new(
        pool: PgPool,
        products: ProductRepository,
        sales: SaleRepository,
        movements: StockMovementRepository,
    ) -> Self {
        Self {
            pool,
            products,
            sales,
            movements,
        }
    }

    /// Registra uma venda do balcão: baixa o estoque de cada item com
    /// guarda de saldo, grava a venda, os itens e as movimentações, tudo
    /// na mesma transação. Qualquer item sem saldo desfaz a venda inteira.
    pub async fn create_pos_sale(
        &self,
        tenant_id: Uuid,
        items: &[PosSaleItemInput],
    ) -> Result<SaleWithItems, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Baixa atômica por item (UPDATE ... WHERE stock >= qty).
        //    O preço praticado é o sell_price vigente no momento da baixa.
        let mut lines: Vec<(Uuid, i32, Decimal)> = Vec::with_capacity(items.len());
        let mut total = Decimal::ZERO;

        for item in items {
            let product = self
                .products
                .try_decrement_stock(&mut *tx, tenant_id, item.product_id, item.quantity)
                .await?;

            let Some(product) = product else {
                // Distingue produto inexistente de saldo insuficiente.
                return match self.products.find_by_id(tenant_id, item.product_id).await? {
                    None => Err(AppError::ProductNotFound),
                    Some(p) => Err(AppError::InsufficientStock(p.name)),
                };
            };

            total += product.sell_price * Decimal::from(item.quantity);
            lines.push((product.id, item.quantity, product.sell_price));
        }

        // 2. Venda e itens.
        let sale = self
            .sales
            .insert_pos_sale(&mut *tx, tenant_id, total, Utc::now())
            .await?;

        let mut sale_items: Vec<SaleItem> = Vec::with_capacity(lines.len());
        for (product_id, quantity, price_at_sale) in &lines {
            let sale_item = self
                .sales
                .insert_sale_item(&mut *tx, sale.id, *product_id, *quantity, *price_at_sale)
                .await?;
            sale_items.push(sale_item);

            // 3. Trilha de auditoria da baixa.
            self.movements
                .record_movement(
                    &mut *tx,
                    tenant_id,
                    *product_id,
                    MovementType::Saida,
                    -quantity,
                    "Venda",
                )
                .await?;
        }

        tx.commit().await?;

        Ok(SaleWithItems {
            sale,
            items: sale_items,
        })
    }

    /// Lista as vendas do tenant com seus itens, mais recentes primeiro.
    pub async fn list_sales(&self, tenant_id: Uuid) -> Result<Vec<SaleWithItems>, AppError> {
        let sales = self.sales.list_by_tenant(tenant_id).await?;

        let sale_ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
        let mut items_by_sale: HashMap<Uuid, Vec<SaleItem>> = HashMap::new();
        for item in self.sales.list_items_for_sales(&sale_ids).await? {
            items_by_sale.entry(item.sale_id).or_default().push(item);
        }

        Ok(sales
            .into_iter()
            .map(|sale| {
                let items = items_by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, items }
            })
            .collect())
    }
}
