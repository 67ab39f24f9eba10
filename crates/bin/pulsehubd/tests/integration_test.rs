//! End-to-end tests for the full pulsehubd stack.
//!
//! Each test wires the complete application (in-memory repos, real
//! services, event bus, Automate integration) against the simulated hub.
//! No task outlives its test.

use std::sync::Arc;
use std::time::Duration;

use pulsehub_adapter_automate::simulated::{HubCommand, SimulatedHub};
use pulsehub_adapter_automate::{AutomateConfig, AutomateIntegration, PulseHub, Roller};
use pulsehub_adapter_storage_memory::{InMemoryDeviceRepository, InMemoryEntityRepository};
use pulsehub_app::dispatcher::Dispatcher;
use pulsehub_app::entry_store::EntryStore;
use pulsehub_app::event_bus::InProcessEventBus;
use pulsehub_app::ports::Integration;
use pulsehub_app::services::device_service::DeviceService;
use pulsehub_app::services::entity_service::EntityService;
use pulsehub_app::services::integration_context::ServiceContext;
use pulsehub_domain::entity::{AttributeValue, EntityState};
use pulsehub_domain::error::PulseHubError;
use pulsehub_domain::event::{Event, EventType};
use pulsehub_domain::service::ServiceCallError;
use serde_json::json;
use tokio::sync::broadcast;

type Ctx = ServiceContext<InMemoryDeviceRepository, InMemoryEntityRepository, InProcessEventBus>;

struct Stack {
    ctx: Ctx,
    bus: InProcessEventBus,
    client: Arc<SimulatedHub>,
    store: Arc<EntryStore<PulseHub<SimulatedHub>>>,
    integration: AutomateIntegration<SimulatedHub>,
}

fn stack(rollers: Vec<Roller>) -> Stack {
    let bus = InProcessEventBus::new(256);
    let ctx = ServiceContext::new(
        Arc::new(DeviceService::new(InMemoryDeviceRepository::new())),
        Arc::new(EntityService::new(
            InMemoryEntityRepository::new(),
            bus.clone(),
        )),
        bus.clone(),
    );
    let client = Arc::new(SimulatedHub::new(rollers, Duration::ZERO));
    let store = Arc::new(EntryStore::new());
    let integration = AutomateIntegration::new(
        &AutomateConfig::default(),
        Arc::clone(&client),
        Arc::clone(&store),
        Arc::new(Dispatcher::default()),
    );
    Stack {
        ctx,
        bus,
        client,
        store,
        integration,
    }
}

async fn started(rollers: Vec<Roller>) -> Stack {
    let mut stack = stack(rollers);
    stack.integration.setup(&stack.ctx).await.unwrap();
    stack
        .integration
        .start_background(stack.ctx.clone())
        .await
        .unwrap();
    stack
}

/// Wait for the first event matching `predicate`.
async fn next_event(
    events: &mut broadcast::Receiver<Event>,
    predicate: impl Fn(&Event) -> bool,
) -> Event {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.unwrap();
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("expected event was not published")
}

fn lounge() -> Roller {
    Roller::new("ABC", "Lounge")
        .with_closed_percent(0)
        .with_battery(80, 3.9)
}

#[tokio::test]
async fn should_register_cover_and_battery_for_each_roller() {
    let stack = started(vec![lounge(), Roller::new("DEF", "Office")]).await;

    let entities = stack.ctx.entity_service().list_entities().await.unwrap();
    assert_eq!(entities.len(), 4);
    let devices = stack.ctx.device_service().list_devices().await.unwrap();
    assert_eq!(devices.len(), 2);

    let cover = stack
        .ctx
        .entity_service()
        .get_entity_by_entity_id("cover.automate_abc")
        .await
        .unwrap();
    assert_eq!(cover.state, EntityState::Open);
    assert_eq!(
        cover.get_attribute("current_position"),
        Some(&AttributeValue::Int(100))
    );
    assert_eq!(
        cover.get_attribute("supported_features"),
        Some(&AttributeValue::Int(15))
    );

    let battery = stack
        .ctx
        .entity_service()
        .get_entity_by_entity_id("sensor.automate_abc_battery")
        .await
        .unwrap();
    assert_eq!(battery.state, EntityState::Unknown);
    assert_eq!(
        battery.get_attribute("battery_level"),
        Some(&AttributeValue::Int(80))
    );
    assert_eq!(battery.device_id, cover.device_id);

    let office = stack
        .ctx
        .entity_service()
        .get_entity_by_entity_id("cover.automate_def")
        .await
        .unwrap();
    assert_eq!(
        office.get_attribute("supported_features"),
        Some(&AttributeValue::Int(0))
    );
}

#[tokio::test]
async fn should_publish_state_change_after_closing_cover() {
    let stack = started(vec![lounge()]).await;
    let cover = stack
        .ctx
        .entity_service()
        .get_entity_by_entity_id("cover.automate_abc")
        .await
        .unwrap();
    let mut events = stack.bus.subscribe();

    stack
        .integration
        .handle_service_call(cover.id, "close_cover", json!({}))
        .await
        .unwrap();

    let event = next_event(&mut events, |event| {
        event.event_type == EventType::StateChanged
            && event.entity_id == Some(cover.id)
            && event.data["new_state"] == "closed"
    })
    .await;
    assert_eq!(event.data["old_state"], "open");
    assert_eq!(
        stack.client.history(),
        vec![HubCommand::Down("ABC".to_string())]
    );
}

#[tokio::test]
async fn should_move_to_inverted_position() {
    let stack = started(vec![lounge()]).await;
    let cover = stack
        .ctx
        .entity_service()
        .get_entity_by_entity_id("cover.automate_abc")
        .await
        .unwrap();

    let snapshot = stack
        .integration
        .handle_service_call(cover.id, "set_cover_position", json!({"position": 30}))
        .await
        .unwrap();

    assert_eq!(
        stack.client.history(),
        vec![HubCommand::MoveTo("ABC".to_string(), 70)]
    );
    assert_eq!(
        snapshot.get_attribute("current_position"),
        Some(&AttributeValue::Int(30))
    );
}

#[tokio::test]
async fn should_discover_roller_added_after_setup() {
    let stack = started(vec![lounge()]).await;
    let mut events = stack.bus.subscribe();

    stack.client.add_roller(Roller::new("XYZ", "Bedroom"));

    next_event(&mut events, |event| {
        event.event_type == EventType::EntityCreated
            && event.data["entity_id"] == "cover.automate_xyz"
    })
    .await;
    let added = stack
        .ctx
        .entity_service()
        .get_entity_by_entity_id("cover.automate_xyz")
        .await
        .unwrap();
    assert!(stack.integration.owns_entity(added.id));
}

#[tokio::test]
async fn should_refuse_unsupported_and_unknown_calls() {
    let stack = started(vec![Roller::new("DEF", "Office")]).await;
    let cover = stack
        .ctx
        .entity_service()
        .get_entity_by_entity_id("cover.automate_def")
        .await
        .unwrap();

    let refused = stack
        .integration
        .handle_service_call(cover.id, "open_cover", json!({}))
        .await;
    assert!(matches!(
        refused,
        Err(PulseHubError::Service(ServiceCallError::NotSupported { .. }))
    ));

    let unknown = stack
        .integration
        .handle_service_call(cover.id, "toggle", json!({}))
        .await;
    assert!(matches!(
        unknown,
        Err(PulseHubError::Service(ServiceCallError::UnknownService(_)))
    ));
    assert!(stack.client.history().is_empty());
}

#[tokio::test]
async fn should_release_hub_on_teardown() {
    let mut stack = started(vec![lounge()]).await;
    let entry_id = stack.integration.entry().entry_id;
    assert!(stack.store.contains(entry_id));

    stack.integration.teardown().await.unwrap();

    assert!(stack.store.is_empty());
    assert!(!stack.client.is_connected());
}
