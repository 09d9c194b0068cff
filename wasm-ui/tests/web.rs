//! Browser-side tests, run with `wasm-pack test --headless --firefox`.

use datamapper_ui::client::resolve_config;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn compiled_base_wins_over_origin() {
    let config = resolve_config(
        Some("http://api.internal:9000/v1"),
        Some("http://localhost:8080".to_string()),
    )
    .unwrap();
    assert_eq!(config.base_url.as_str(), "http://api.internal:9000/v1/");
}

#[wasm_bindgen_test]
fn blank_compiled_base_falls_back_to_origin() {
    let config = resolve_config(Some("  "), Some("https://mapper.example.com".to_string())).unwrap();
    assert_eq!(config.base_url.as_str(), "https://mapper.example.com/");
}

#[wasm_bindgen_test]
fn missing_address_is_an_error() {
    assert!(resolve_config(None, None).is_err());
}

#[wasm_bindgen_test]
fn file_origin_is_rejected() {
    assert!(resolve_config(None, Some("null".to_string())).is_err());
}

mod abort {
    use datamapper::{ClientConfig, ClientError, MapperApi};
    use datamapper_ui::client::GlooApi;
    use wasm_bindgen_test::*;
    use web_sys::AbortController;

    fn api() -> GlooApi {
        GlooApi::new(&ClientConfig::new("http://127.0.0.1:9").unwrap())
    }

    #[wasm_bindgen_test]
    fn plain_client_is_never_aborted() {
        assert!(!api().is_aborted());
    }

    #[wasm_bindgen_test]
    async fn aborted_signal_fails_requests_as_transport() {
        let controller = AbortController::new().unwrap();
        let api = api().with_signal(Some(controller.signal()));
        assert!(!api.is_aborted());

        controller.abort();
        assert!(api.is_aborted());

        let result = api.list_mappings().await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }

    #[wasm_bindgen_test]
    fn copies_share_the_signal() {
        let controller = AbortController::new().unwrap();
        let api = api().with_signal(Some(controller.signal()));
        let copy = api.clone();

        controller.abort();
        assert!(copy.is_aborted());
        assert!(api == copy);
    }
}

mod toast {
    use std::cell::Cell;
    use std::rc::Rc;

    use datamapper::{Flow, Notice};
    use datamapper_ui::components::{Toast, ToastProps};
    use gloo::timers::future::TimeoutFuture;
    use wasm_bindgen_test::*;
    use web_sys::Element;
    use yew::Callback;

    fn mount_point() -> Element {
        let root = gloo::utils::document().create_element("div").unwrap();
        gloo::utils::body().append_child(&root).unwrap();
        root
    }

    fn props(ttl_ms: u32, dismissed: &Rc<Cell<bool>>) -> ToastProps {
        let dismissed = dismissed.clone();
        ToastProps {
            notice: Some(Notice::error(
                Flow::ToggleScheduler,
                "Failed to update scheduler.",
            )),
            ttl_ms,
            on_dismiss: Callback::from(move |_| dismissed.set(true)),
        }
    }

    #[wasm_bindgen_test]
    async fn notice_dismisses_itself_after_ttl() {
        let dismissed = Rc::new(Cell::new(false));
        let root = mount_point();
        let handle =
            yew::Renderer::<Toast>::with_root_and_props(root.clone(), props(50, &dismissed))
                .render();

        TimeoutFuture::new(10).await;
        assert!(root.inner_html().contains("Failed to update scheduler."));
        assert!(!dismissed.get());

        TimeoutFuture::new(100).await;
        assert!(dismissed.get());
        handle.destroy();
    }

    #[wasm_bindgen_test]
    async fn unmount_cancels_pending_dismiss() {
        let dismissed = Rc::new(Cell::new(false));
        let handle =
            yew::Renderer::<Toast>::with_root_and_props(mount_point(), props(50, &dismissed))
                .render();

        TimeoutFuture::new(10).await;
        handle.destroy();

        TimeoutFuture::new(100).await;
        assert!(!dismissed.get());
    }
}
