// poller.rs

use reqwest::{Client, StatusCode};

use crate::*;

/// Hard cap on one sensor read.
pub const FETCH_TIMEOUT: Duration = Duration::from_millis(5000);
/// Shorter cap for the startup reachability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Fetch loop. Reads the interval from the shared config on every cycle,
/// so a config change takes effect on the next round without a restart.
/// An explicit refresh request short-circuits the timer.
pub async fn run_poller(state: Arc<MonitorState>) -> anyhow::Result<()> {
    let client = Client::builder().build()?;

    // copy the endpoint out, the probe must not sit on the config lock
    let (host, port) = {
        let c = state.config.read().await;
        (c.host.clone(), c.port)
    };
    let up = probe_endpoint(&client, &host, port).await;
    info!("Sensor {host}:{port} reachable: {up}");

    // first reading right away, the rest on the timer
    Box::pin(poll_once(&state, &client)).await;

    loop {
        let poll_ms = state.config.read().await.poll_ms;
        tokio::select! {
            _ = sleep(Duration::from_millis(poll_ms)) => {}
            _ = state.refresh.notified() => {}
        }
        Box::pin(poll_once(&state, &client)).await;
    }
}

/// One poll cycle: fetch or simulate, publish the reading, optionally
/// append it to the history. Never fails, the loop must go on.
pub async fn poll_once(state: &MonitorState, client: &Client) {
    let cnt = state.poll_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} poll_once()");

    state.current.write().await.fetching = true;

    let (use_simulated, auto_record, base_url) = {
        let c = state.config.read().await;
        (c.use_simulated, c.auto_record, c.base_url())
    };

    let (value, connected, notice) = if use_simulated {
        (simulated_temperature(), false, String::new())
    } else {
        match fetch_temperature(client, &base_url).await {
            Ok(value) => (value, true, String::new()),
            Err(e) => {
                warn!("#{cnt} sensor fetch failed: {e:?}");
                (
                    simulated_temperature(),
                    false,
                    "using simulated reading, sensor not reachable".to_string(),
                )
            }
        }
    };

    // stamped once the attempt has resolved, not when it started
    let now = Local::now();
    let reading = CurrentReading {
        value,
        fetching: false,
        connected,
        last_update: now.format("%H:%M:%S").to_string(),
        timestamp: now.timestamp_millis(),
        notice,
    };

    debug!("#{cnt} temperature {v:.1}", v = reading.value);
    *state.current.write().await = reading;

    if auto_record {
        if let Err(e) = state.record_current().await {
            warn!("#{cnt} auto record failed: {e:?}");
        }
    }
}

/// GET {base_url}/temperatura and pull the value out of the JSON reply.
pub async fn fetch_temperature(client: &Client, base_url: &str) -> anyhow::Result<f32> {
    let url = format!("{base_url}/temperatura");
    let resp = client
        .get(&url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;
    let sensor = resp.json::<SensorResponse>().await?;
    if let Some(status) = &sensor.status {
        debug!("Sensor status: {status}");
    }
    Ok(sensor.temperatura)
}

/// GET /status on the sensor, true only on a plain 200.
pub async fn probe_endpoint(client: &Client, host: &str, port: u16) -> bool {
    let url = format!("http://{host}:{port}/status");
    match client.get(&url).timeout(PROBE_TIMEOUT).send().await {
        Ok(resp) => resp.status() == StatusCode::OK,
        Err(e) => {
            debug!("Sensor probe failed: {e:?}");
            false
        }
    }
}

/// Stand-in reading when no sensor answers. Whole tenths, always inside
/// 20.0..=34.9.
pub fn simulated_temperature() -> f32 {
    20.0 + ((rand::random::<f32>() * 150.0) as u32) as f32 / 10.0
}


// EOF
