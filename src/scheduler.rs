// src/scheduler.rs
//
// Loops de sincronização em background: um intervalo tokio por rotina.
// As rotinas carregam seus próprios locks, então um tick que dispara
// enquanto o anterior ainda roda vira no-op.

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::{config::SyncConfig, services::SyncService};

pub fn spawn(sync_service: Arc<SyncService>, config: SyncConfig) {
    let Some(tenant_id) = config.tenant_id else {
        warn!("SYNC_TENANT_ID não definido; agendador de sync desligado");
        return;
    };

    let products_interval = config.products_interval;
    let orders_interval = config.orders_interval;
    let visits_interval = config.visits_interval;

    info!(
        "⏰ Agendador de sync ativo para o tenant {} (produtos: {}s, vendas: {}s, visitas: {}s)",
        tenant_id,
        products_interval.as_secs(),
        orders_interval.as_secs(),
        visits_interval.as_secs()
    );

    {
        let service = sync_service.clone();
        tokio::spawn(async move {
            run_loop(products_interval, || async {
                match service.run_product_sync(tenant_id).await {
                    Ok(report) if !report.skipped => info!(
                        "Sync agendada de produtos: {} ok, {} erros",
                        report.synced_count,
                        report.errors.len()
                    ),
                    Ok(_) => {}
                    Err(e) => error!("Sync agendada de produtos falhou: {}", e),
                }
            })
            .await;
        });
    }

    {
        let service = sync_service.clone();
        tokio::spawn(async move {
            run_loop(orders_interval, || async {
                match service.run_order_sync(tenant_id).await {
                    Ok(report) if !report.skipped => info!(
                        "Sync agendada de vendas: {} ok, {} erros",
                        report.synced_count,
                        report.errors.len()
                    ),
                    Ok(_) => {}
                    Err(e) => error!("Sync agendada de vendas falhou: {}", e),
                }
            })
            .await;
        });
    }

    {
        let service = sync_service;
        tokio::spawn(async move {
            run_loop(visits_interval, || async {
                // As rotinas de métricas já engolem os próprios erros.
                service.run_visit_metrics_sync(tenant_id).await;
                service.run_behavior_metrics_sync(tenant_id).await;
            })
            .await;
        });
    }
}

async fn run_loop<F, Fut>(period: Duration, mut tick_fn: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let mut ticker = interval(period);
    // Tick perdido (rotina mais lenta que o período) não gera rajada.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // O primeiro tick dispara imediatamente: sync na subida do servidor.
    loop {
        ticker.tick().await;
        tick_fn().await;
    }
}
