use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::matchmaking::Enqueued;
use crate::state::app_state::AppState;
use crate::ws::hub::SessionEventMsg;
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// Out-of-band notification for queued players (match found, etc).
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct QueueNotice(pub ServerMsg);

#[derive(serde::Deserialize)]
pub struct WsQuery {
    player_id: Uuid,
}

/// GET /ws?player_id= — upgrade to the realtime channel.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(query.player_id, app_state);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    player_id: Uuid,
    app_state: web::Data<AppState>,
    last_heartbeat: Instant,
    in_queue: bool,
}

impl WsSession {
    fn new(player_id: Uuid, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            player_id,
            app_state,
            last_heartbeat: Instant::now(),
            in_queue: false,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "failed to serialize outbound ws message"),
        }
    }

    fn send_error(
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: message.into(),
            },
        );
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    player_id = %actor.player_id,
                    "ws heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_join_queue(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let channel = ctx.address().recipient::<QueueNotice>();
        match self
            .app_state
            .matchmaking
            .enqueue(self.player_id, channel)
        {
            Enqueued::Waiting { position } => {
                self.in_queue = true;
                Self::send_json(ctx, &ServerMsg::QueueJoined { position });
            }
            Enqueued::Matched {
                player_one,
                player_two,
            } => {
                self.in_queue = false;
                let flow = self.app_state.flow.clone();
                ctx.spawn(
                    async move {
                        let session = flow
                            .create_from_match(player_one.player_id, player_two.player_id)
                            .await?;
                        // Queue contract: the caller notifies both matched
                        // entries through their channel handles.
                        let _ = player_one.channel.do_send(QueueNotice(ServerMsg::GameFound {
                            session_id: session.id,
                            opponent_id: session.player_two_id,
                            phase: session.phase,
                        }));
                        let _ = player_two.channel.do_send(QueueNotice(ServerMsg::GameFound {
                            session_id: session.id,
                            opponent_id: session.player_one_id,
                            phase: session.phase,
                        }));
                        Ok::<(), crate::errors::DomainError>(())
                    }
                    .into_actor(self)
                    .map(|res, actor, ctx| {
                        if let Err(err) = res {
                            tracing::error!(
                                error = %err,
                                player_id = %actor.player_id,
                                "session creation from match failed"
                            );
                            Self::send_error(ctx, ErrorCode::Internal, "Failed to create session");
                        }
                    }),
                );
            }
        }
    }

    fn handle_join_session(&self, session_id: Uuid, ctx: &mut ws::WebsocketContext<Self>) {
        let flow = self.app_state.flow.clone();
        let registry = self.app_state.registry.clone();
        let player_id = self.player_id;
        let conn_id = self.conn_id;
        let recipient = ctx.address().recipient::<SessionEventMsg>();

        ctx.spawn(
            async move {
                let session =
                    crate::repos::sessions::require_session(flow.store().as_ref(), session_id)
                        .await?;
                Ok::<bool, crate::errors::DomainError>(session.is_participant(player_id))
            }
            .into_actor(self)
            .map(move |res, _actor, ctx| match res {
                Ok(true) => {
                    // Idempotent: re-subscribing the same connection replaces
                    // its own registry entry.
                    registry.subscribe(session_id, conn_id, recipient);
                    Self::send_json(ctx, &ServerMsg::Ack { message: "subscribed" });
                }
                Ok(false) => {
                    // Fanout goes to participants only; spectators are
                    // refused rather than silently ignored.
                    Self::send_error(ctx, ErrorCode::Forbidden, "Not a participant");
                }
                Err(err) => {
                    Self::send_error(ctx, ErrorCode::NotFound, err.to_string());
                }
            }),
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, player_id = %self.player_id, "ws session started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.app_state.registry.unsubscribe_all(self.conn_id);
        if self.in_queue {
            self.app_state.matchmaking.cancel(self.player_id);
        }
        info!(conn_id = %self.conn_id, player_id = %self.player_id, "ws session stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    Self::send_error(ctx, ErrorCode::BadRequest, "Malformed JSON");
                    return;
                };

                match cmd {
                    ClientMsg::JoinQueue => self.handle_join_queue(ctx),
                    ClientMsg::LeaveQueue => {
                        self.in_queue = false;
                        self.app_state.matchmaking.cancel(self.player_id);
                        Self::send_json(ctx, &ServerMsg::Ack { message: "left_queue" });
                    }
                    ClientMsg::JoinSession { session_id } => {
                        self.handle_join_session(session_id, ctx)
                    }
                    ClientMsg::LeaveSession { session_id } => {
                        self.app_state.registry.unsubscribe(session_id, self.conn_id);
                        Self::send_json(ctx, &ServerMsg::Ack { message: "unsubscribed" });
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    player_id = %self.player_id,
                    error = %err,
                    "ws protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<SessionEventMsg> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: SessionEventMsg, ctx: &mut Self::Context) -> Self::Result {
        Self::send_json(ctx, &ServerMsg::from_event(msg.session_id, msg.event));
    }
}

impl Handler<QueueNotice> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: QueueNotice, ctx: &mut Self::Context) -> Self::Result {
        self.in_queue = false;
        Self::send_json(ctx, &msg.0);
    }
}
