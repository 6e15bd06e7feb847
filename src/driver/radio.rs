//! Crazyradio / USB backend built on `crazyflie-lib`.
//!
//! Connecting runs in a background task: success, failure and the eventual
//! loss of the link are all reported as [`LinkEvent`]s.

use async_trait::async_trait;
use crazyflie_lib::Crazyflie;
use crazyflie_link::LinkContext;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::toc_cache::DirTocCache;
use super::{FlightDriver, LinkEvent, LinkEvents};
use crate::commander::setpoint::Setpoint;
use crate::error::{ComponentError, Result};
use crate::link::LinkAddress;

pub struct RadioDriver {
    context: Arc<LinkContext>,
    toc_cache: DirTocCache,
    crazyflie: Arc<Mutex<Option<Arc<Crazyflie>>>>,
    closing: Arc<AtomicBool>,
}

impl RadioDriver {
    /// Create the link context and the TOC cache in `cache_dir`
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let toc_cache = DirTocCache::new(cache_dir)?;
        info!("Crazyflie radio driver ready");
        Ok(Self {
            context: Arc::new(LinkContext::new()),
            toc_cache,
            crazyflie: Arc::new(Mutex::new(None)),
            closing: Arc::new(AtomicBool::new(false)),
        })
    }

    async fn connected(&self) -> Result<Arc<Crazyflie>> {
        self.crazyflie
            .lock()
            .await
            .clone()
            .ok_or_else(|| ComponentError::Link("no Crazyflie connected".to_string()))
    }
}

#[async_trait]
impl FlightDriver for RadioDriver {
    async fn open_link(&self, address: &LinkAddress, events: LinkEvents) -> Result<()> {
        if self.crazyflie.lock().await.is_some() {
            return Err(ComponentError::Link(format!("link to {} already open", address)));
        }
        self.closing.store(false, Ordering::Relaxed);

        let uri = address.to_string();
        let context = self.context.clone();
        let toc_cache = self.toc_cache.clone();
        let slot = self.crazyflie.clone();
        let closing = self.closing.clone();

        tokio::spawn(async move {
            let event = match Crazyflie::connect_from_uri(&context, &uri, toc_cache).await {
                Ok(cf) => {
                    let cf = Arc::new(cf);
                    *slot.lock().await = Some(cf.clone());
                    let _ = events.send(LinkEvent::Connected { uri: uri.clone() });

                    let reason = cf.wait_disconnect().await;
                    slot.lock().await.take();

                    if closing.load(Ordering::Relaxed) {
                        LinkEvent::Disconnected { uri }
                    } else {
                        LinkEvent::ConnectionLost { uri, msg: reason }
                    }
                }
                Err(e) => LinkEvent::ConnectionFailed {
                    uri,
                    msg: format!("{:?}", e),
                },
            };
            let _ = events.send(event);
        });

        Ok(())
    }

    async fn close_link(&self) -> Result<()> {
        self.closing.store(true, Ordering::Relaxed);
        let cf = self.crazyflie.lock().await.clone();
        if let Some(cf) = cf {
            cf.disconnect().await;
        }
        Ok(())
    }

    async fn send_setpoint(&self, setpoint: Setpoint) -> Result<()> {
        let cf = self.connected().await?;
        cf.commander
            .setpoint_rpyt(setpoint.roll, setpoint.pitch, setpoint.yaw_rate, setpoint.thrust)
            .await
            .map_err(|e| ComponentError::Link(format!("{:?}", e)))?;
        debug!("Sent setpoint with thrust {}", setpoint.thrust);
        Ok(())
    }

    async fn send_arming_request(&self, arm: bool) -> Result<()> {
        let cf = self.connected().await?;
        cf.platform
            .send_arming_request(arm)
            .await
            .map_err(|e| ComponentError::Link(format!("{:?}", e)))
    }
}
