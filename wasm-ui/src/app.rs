//! Main application component.

use datamapper::ClientConfig;
use yew::prelude::*;

use crate::client::{GlooApi, page_config};
use crate::components::{MappingPanel, SchedulerPanel, WebhookPanel};

fn ttl_millis(config: &ClientConfig) -> u32 {
    u32::try_from(config.notice_ttl.as_millis()).unwrap_or(u32::MAX)
}

#[function_component(App)]
pub fn app() -> Html {
    // Resolved once; every panel shares the same address.
    let config = use_memo((), |_| page_config());

    let body = match &*config {
        Ok(config) => {
            let api = GlooApi::new(config);
            let ttl_ms = ttl_millis(config);
            html! {
                <main class="main">
                    <div class="panels">
                        <div class="column">
                            <MappingPanel api={api.clone()} notice_ttl_ms={ttl_ms} />
                        </div>
                        <div class="column">
                            <SchedulerPanel
                                api={api.clone()}
                                task_name={config.task_name.clone()}
                                notice_ttl_ms={ttl_ms}
                            />
                            <WebhookPanel api={api} />
                        </div>
                    </div>
                </main>
            }
        }
        Err(e) => html! {
            <main class="main">
                <div class="alert alert-error">{ format!("Configuration error: {}", e) }</div>
            </main>
        },
    };

    let address = match &*config {
        Ok(config) => config.base_url.to_string(),
        Err(_) => "unset".to_string(),
    };

    html! {
        <div class="app">
            <header class="header">
                <div class="header-left">
                    <h1>{ "DataMapper" }</h1>
                    <p class="subtitle">{ "Field mappings, scheduler control and webhook testing" }</p>
                </div>
            </header>

            { body }

            <footer class="footer">
                <div class="footer-row">
                    <span class="footer-left">{ format!("Service: {}", address) }</span>
                    <span class="footer-build">
                        { format!("Build: {}@{} {}", env!("BUILD_HOST"), env!("BUILD_COMMIT"), env!("BUILD_TIMESTAMP")) }
                    </span>
                </div>
            </footer>
        </div>
    }
}
