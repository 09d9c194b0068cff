//! UI components for the four flows.

use datamapper::scheduler::STATUS_UNAVAILABLE;
use datamapper::{
    Banner, FieldMapping, FlagController, FlagState, ForwardError, MapperApi, Notice,
    RequestSequence, parse_payload,
};
use gloo::timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use web_sys::{AbortController, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::client::GlooApi;
use crate::state::{
    BookAction, BookState, FlagAction, FlagStateHolder, ForwarderAction, ForwarderState,
};

/// Copy of `api` bound to this component's lifetime.
///
/// Requests issued through it are aborted when the component unmounts.
#[hook]
fn use_component_api(api: &GlooApi) -> GlooApi {
    let controller = use_memo((), |_| AbortController::new().ok());
    {
        let controller = controller.clone();
        use_effect_with((), move |_| {
            move || {
                if let Some(controller) = &*controller {
                    controller.abort();
                }
            }
        });
    }
    api.with_signal((*controller).as_ref().map(|c| c.signal()))
}

/// Transient notice that hides itself after `ttl_ms`.
#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub notice: Option<Notice>,
    pub ttl_ms: u32,
    pub on_dismiss: Callback<()>,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    {
        let on_dismiss = props.on_dismiss.clone();
        let ttl_ms = props.ttl_ms;
        use_effect_with(props.notice.clone(), move |notice| {
            let handle = notice
                .as_ref()
                .map(|_| Timeout::new(ttl_ms, move || on_dismiss.emit(())));
            // Dropping the handle cancels the timer.
            move || drop(handle)
        });
    }

    let Some(notice) = &props.notice else {
        return html! {};
    };

    let on_close = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };

    html! {
        <div
            class={classes!("toast", if notice.is_error() { "toast-error" } else { "toast-success" })}
            role="status"
        >
            <span>{ notice.message }</span>
            <button class="toast-close" onclick={on_close}>{ "\u{00D7}" }</button>
        </div>
    }
}

/// Form and list for field mappings, backed by one [`datamapper::MappingBook`].
#[derive(Properties, PartialEq)]
pub struct MappingPanelProps {
    pub api: GlooApi,
    pub notice_ttl_ms: u32,
}

#[function_component(MappingPanel)]
pub fn mapping_panel(props: &MappingPanelProps) -> Html {
    let api = use_component_api(&props.api);
    let book = use_reducer(BookState::default);

    // Load once on mount; no refresh afterwards.
    {
        let api = api.clone();
        let book = book.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let result = api.list_mappings().await;
                if !api.is_aborted() {
                    book.dispatch(BookAction::Listed(result));
                }
            });
            || ()
        });
    }

    let on_api_input = {
        let book = book.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            book.dispatch(BookAction::SetApiField(input.value()));
        })
    };

    let on_db_input = {
        let book = book.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            book.dispatch(BookAction::SetDbField(input.value()));
        })
    };

    let on_submit = {
        let api = api.clone();
        let book = book.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let mut draft = book.0.clone();
            let validated = draft.validate();
            book.dispatch(BookAction::Validate);

            if let Ok(new_mapping) = validated {
                let api = api.clone();
                let book = book.clone();
                spawn_local(async move {
                    let result = api.create_mapping(&new_mapping).await;
                    if !api.is_aborted() {
                        book.dispatch(BookAction::Created(result));
                    }
                });
            }
        })
    };

    let on_dismiss = {
        let book = book.clone();
        Callback::from(move |_: ()| book.dispatch(BookAction::DismissNotice))
    };

    let errors = book.0.errors();

    html! {
        <>
            <section class="panel">
                <h2 class="panel-title">{ "New Field Mapping" }</h2>
                <form onsubmit={on_submit} novalidate=true>
                    <div class="form-group">
                        <label class="form-label">{ "API Field" }</label>
                        <input
                            type="text"
                            class={classes!("form-input", errors.api_field.map(|_| "invalid"))}
                            value={book.0.api_field().to_string()}
                            oninput={on_api_input}
                        />
                        if let Some(message) = errors.api_field {
                            <span class="field-error">{ message }</span>
                        }
                    </div>
                    <div class="form-group">
                        <label class="form-label">{ "DB Field" }</label>
                        <input
                            type="text"
                            class={classes!("form-input", errors.db_field.map(|_| "invalid"))}
                            value={book.0.db_field().to_string()}
                            oninput={on_db_input}
                        />
                        if let Some(message) = errors.db_field {
                            <span class="field-error">{ message }</span>
                        }
                    </div>
                    <button type="submit" class="btn btn-primary">{ "+ Add Mapping" }</button>
                </form>
                <Toast
                    notice={book.0.notice().cloned()}
                    ttl_ms={props.notice_ttl_ms}
                    on_dismiss={on_dismiss}
                />
            </section>
            <section class="panel">
                <h2 class="panel-title">{ "Field Mappings" }</h2>
                <MappingList mappings={book.0.mappings().to_vec()} />
            </section>
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct MappingListProps {
    pub mappings: Vec<FieldMapping>,
}

#[function_component(MappingList)]
pub fn mapping_list(props: &MappingListProps) -> Html {
    if props.mappings.is_empty() {
        return html! {
            <p class="placeholder">{ datamapper::mappings::PLACEHOLDER }</p>
        };
    }

    html! {
        <ul class="mapping-list">
            { for props.mappings.iter().map(|mapping| html! {
                <li key={mapping.id.to_string()} class="mapping-item">
                    { mapping.arrow_line() }
                </li>
            })}
        </ul>
    }
}

/// Switch mirroring the remote scheduler flag.
#[derive(Properties, PartialEq)]
pub struct SchedulerPanelProps {
    pub api: GlooApi,
    pub task_name: String,
    pub notice_ttl_ms: u32,
}

#[function_component(SchedulerPanel)]
pub fn scheduler_panel(props: &SchedulerPanelProps) -> Html {
    let api = use_component_api(&props.api);
    let flag = {
        let task_name = props.task_name.clone();
        use_reducer(move || FlagStateHolder(FlagController::new(task_name)))
    };
    let sequence = use_mut_ref(RequestSequence::default);

    {
        let api = api.clone();
        let flag = flag.clone();
        let sequence = sequence.clone();
        use_effect_with((), move |_| {
            let seq = sequence.borrow_mut().next();
            let task_name = flag.0.flag().task_name.clone();
            spawn_local(async move {
                let result = api.get_scheduler(&task_name).await;
                if !api.is_aborted() {
                    flag.dispatch(FlagAction::Fetched { seq, result });
                }
            });
            || ()
        });
    }

    // One request per click, built from the state of the latest render.
    let on_toggle = {
        let api = api.clone();
        let flag = flag.clone();
        Callback::from(move |_: MouseEvent| {
            let request = flag.0.toggle_request(sequence.borrow_mut().next());
            let api = api.clone();
            let flag = flag.clone();
            spawn_local(async move {
                let result = api
                    .set_scheduler(&request.task_name, request.enabled)
                    .await;
                if !api.is_aborted() {
                    flag.dispatch(FlagAction::Toggled {
                        seq: request.seq,
                        result,
                    });
                }
            });
        })
    };

    let on_dismiss = {
        let flag = flag.clone();
        Callback::from(move |_: ()| flag.dispatch(FlagAction::DismissNotice))
    };

    let controller = &flag.0;
    let enabled = controller.state() == FlagState::Enabled;
    let loading = !controller.is_synced() && controller.last_error().is_none();

    html! {
        <section class="panel">
            <h2 class="panel-title">{ "Scheduler Control" }</h2>
            <div class="switch-row">
                <button
                    class={classes!("switch", enabled.then_some("on"))}
                    role="switch"
                    aria-checked={enabled.to_string()}
                    aria-busy={loading.to_string()}
                    onclick={on_toggle}
                >
                    <span class="switch-knob" />
                </button>
                <span class={classes!("switch-label", loading.then_some("pending"))}>
                    { controller.label() }
                </span>
            </div>
            if let Some(reason) = controller.last_error() {
                <p class="status-hint" title={reason.to_string()}>{ STATUS_UNAVAILABLE }</p>
            }
            <Toast
                notice={controller.notice().cloned()}
                ttl_ms={props.notice_ttl_ms}
                on_dismiss={on_dismiss}
            />
        </section>
    }
}

/// Raw JSON editor that forwards its content to the webhook endpoint.
#[derive(Properties, PartialEq)]
pub struct WebhookPanelProps {
    pub api: GlooApi,
}

#[function_component(WebhookPanel)]
pub fn webhook_panel(props: &WebhookPanelProps) -> Html {
    let api = use_component_api(&props.api);
    let forwarder = use_reducer(ForwarderState::default);

    let on_input = {
        let forwarder = forwarder.clone();
        Callback::from(move |e: InputEvent| {
            let target: HtmlTextAreaElement = e.target_unchecked_into();
            forwarder.dispatch(ForwarderAction::SetText(target.value()));
        })
    };

    let on_send = {
        let api = api.clone();
        let forwarder = forwarder.clone();
        Callback::from(move |_: MouseEvent| {
            // The reducer reports a parse failure; here it only gates the send.
            let parsed = parse_payload(forwarder.0.text());
            forwarder.dispatch(ForwarderAction::Begin);

            if let Ok(payload) = parsed {
                let api = api.clone();
                let forwarder = forwarder.clone();
                spawn_local(async move {
                    let result = api.forward_webhook(&payload).await;
                    if !api.is_aborted() {
                        forwarder.dispatch(ForwarderAction::Finished(result));
                    }
                });
            }
        })
    };

    let banner = forwarder.0.banner();
    let invalid = banner == Some(Banner::Failed(ForwardError::InvalidJson));

    html! {
        <section class="panel">
            <h2 class="panel-title">{ "Send Webhook" }</h2>
            <div class="form-group">
                <label class="form-label">{ "Webhook Payload (JSON)" }</label>
                <textarea
                    class={classes!("payload-input", invalid.then_some("invalid"))}
                    value={forwarder.0.text().to_string()}
                    oninput={on_input}
                    spellcheck="false"
                    rows="4"
                />
            </div>
            <button class="btn btn-secondary" onclick={on_send}>{ "Send Webhook" }</button>
            if let Some(banner) = banner {
                <div class={classes!("alert", if banner.is_error() { "alert-error" } else { "alert-success" })}>
                    { banner.message() }
                </div>
            }
        </section>
    }
}
