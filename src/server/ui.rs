//! Embedded prediction form
//!
//! Posts the eight readings as JSON to `/predict` and shows the returned
//! prediction, or the server's error message, in a modal dialog.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Diabetes Prediction</title>
    <style>
        * { box-sizing: border-box; }
        body {
            font-family: Arial, Helvetica, sans-serif;
            background: linear-gradient(to right, #060053, #007E2E);
            color: #333;
            min-height: 100vh;
            margin: 0;
            padding: 20px;
            display: flex;
            align-items: center;
            justify-content: center;
        }
        h1 { color: #fff; text-align: center; }
        form {
            background: #fff;
            width: 100%;
            max-width: 500px;
            padding: 20px;
            border-radius: 8px;
            box-shadow: 0 0 10px rgba(0, 0, 0, 0.1);
        }
        label { display: block; margin-top: 10px; font-weight: bold; }
        input {
            width: 100%;
            margin-top: 6px;
            padding: 10px;
            border: 1px solid #ccc;
            border-radius: 4px;
        }
        button[type="submit"] {
            width: 100%;
            margin-top: 18px;
            padding: 10px;
            border: none;
            border-radius: 4px;
            background: #009A36;
            color: #fff;
            cursor: pointer;
            transition: background 0.3s ease;
        }
        button[type="submit"]:hover { background: #026800; }
        button[type="submit"]:disabled { background: #7a9c85; cursor: wait; }
        .dialog {
            display: none;
            position: fixed;
            inset: 0;
            background: rgba(0, 0, 0, 0.4);
            align-items: center;
            justify-content: center;
        }
        .dialog.open { display: flex; }
        .dialog-body {
            background: #00BBFF;
            width: 80%;
            max-width: 500px;
            padding: 20px;
            border-radius: 8px;
            text-align: center;
        }
        .dialog-body.failed { background: #ffb3b3; }
        .dismiss {
            float: right;
            font-size: 28px;
            font-weight: bold;
            color: #555;
            cursor: pointer;
        }
        .dismiss:hover { color: #000; }
    </style>
</head>
<body>
    <main>
        <h1>Diabetes Prediction</h1>
        <form id="patient-form">
            <label for="Pregnancies">Pregnancies:</label>
            <input type="number" id="Pregnancies" name="Pregnancies" min="0" required>

            <label for="Glucose">Glucose:</label>
            <input type="number" id="Glucose" name="Glucose" min="0" required>

            <label for="BloodPressure">Blood Pressure:</label>
            <input type="number" id="BloodPressure" name="BloodPressure" min="0" required>

            <label for="SkinThickness">Skin Thickness:</label>
            <input type="number" id="SkinThickness" name="SkinThickness" min="0" required>

            <label for="Insulin">Insulin:</label>
            <input type="number" id="Insulin" name="Insulin" min="0" required>

            <label for="BMI">BMI:</label>
            <input type="number" step="any" id="BMI" name="BMI" min="0" required>

            <label for="DiabetesPedigreeFunction">Diabetes Pedigree Function:</label>
            <input type="number" step="any" id="DiabetesPedigreeFunction" name="DiabetesPedigreeFunction" min="0" required>

            <label for="Age">Age:</label>
            <input type="number" id="Age" name="Age" min="0" required>

            <button type="submit" id="predict-button">Predict</button>
        </form>
    </main>

    <div id="result-dialog" class="dialog">
        <div class="dialog-body" id="result-body">
            <span class="dismiss" id="dismiss">&times;</span>
            <h2 id="result-text"></h2>
        </div>
    </div>

    <script>
        const form = document.getElementById('patient-form');
        const dialog = document.getElementById('result-dialog');
        const body = document.getElementById('result-body');
        const text = document.getElementById('result-text');
        const button = document.getElementById('predict-button');

        function show(message, failed) {
            text.innerText = message;
            body.classList.toggle('failed', failed);
            dialog.classList.add('open');
        }

        form.addEventListener('submit', async (event) => {
            event.preventDefault();
            const payload = Object.fromEntries(new FormData(form).entries());
            button.disabled = true;
            try {
                const response = await fetch('/predict', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify(payload)
                });
                const result = await response.json();
                if (response.ok) {
                    show(result.prediction, false);
                } else {
                    show(result.message || 'Prediction failed', true);
                }
            } catch (err) {
                show('Could not reach the server', true);
            } finally {
                button.disabled = false;
            }
        });

        document.getElementById('dismiss').addEventListener('click', () => dialog.classList.remove('open'));
        window.addEventListener('click', (event) => {
            if (event.target === dialog) {
                dialog.classList.remove('open');
            }
        });
    </script>
</body>
</html>
"#;
